pub mod cache;
pub mod db;
pub mod limiter;
pub mod llm;
pub mod metrics;
pub mod security;
pub mod utils;
