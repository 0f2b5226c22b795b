pub mod catch_panic;
pub mod cors;
pub mod metrics;
pub mod metrics_auth;
pub mod rate_limit;
pub mod security_headers;
pub mod sql_guard;
