pub mod etag;
pub mod get_client_ip;
pub mod redact;
pub mod valid_id;
