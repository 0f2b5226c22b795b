pub mod credentials;
pub mod sanitize;
