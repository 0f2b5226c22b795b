use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::{env, fmt, str::FromStr};

use crate::utils::redact::redact_url;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Staging,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnvironment::Development),
            "staging" => Ok(AppEnvironment::Staging),
            "production" | "prod" => Ok(AppEnvironment::Production),
            "testing" | "test" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitBackend {
    Memory,
    Redis,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Full connection string; takes precedence over the discrete fields below
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_database_host")]
    pub database_host: String,

    #[serde(default = "default_database_port")]
    pub database_port: u16,

    #[serde(default = "default_database_user")]
    pub database_user: String,

    #[serde(default)]
    pub database_password: String,

    #[serde(default = "default_database_name")]
    pub database_name: String,

    #[serde(default)]
    pub database_ssl_mode: Option<String>,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub database_min_connections: u32,

    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_secs: u64,

    #[serde(default = "default_rate_limit_requests")]
    pub rate_limit_requests: u32,

    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,

    #[serde(default = "default_rate_limit_backend")]
    pub rate_limit_backend: RateLimitBackend,

    #[serde(default)]
    pub trust_x_forwarded_for: bool,

    #[serde(default)]
    pub metrics_username: Option<String>,

    #[serde(default)]
    pub metrics_password: Option<String>,

    #[serde(default)]
    pub admin_token: Option<String>,

    #[serde(default = "default_true")]
    pub sql_guard_enabled: bool,

    #[serde(default)]
    pub csp_policy: Option<String>,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Portfolio-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_database_host() -> String {
    "localhost".to_string()
}
fn default_database_port() -> u16 {
    5432
}
fn default_database_user() -> String {
    "postgres".to_string()
}
fn default_database_name() -> String {
    "portfolio".to_string()
}
fn default_max_connections() -> u32 {
    25
}
fn default_min_connections() -> u32 {
    5
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_llm_model() -> String {
    "gemma2:2b".to_string()
}
fn default_llm_timeout() -> u64 {
    60
}
fn default_rate_limit_requests() -> u32 {
    100
}
fn default_rate_limit_window() -> u64 {
    60
}
fn default_rate_limit_backend() -> RateLimitBackend {
    RateLimitBackend::Memory
}
fn default_true() -> bool {
    true
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true),
            )
            .set_override("env", env_name.to_string())?;

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;
        config.apply_legacy_env();
        config.validate()?;
        Ok(config)
    }

    /// Honours the unprefixed variable names used by existing deployments
    /// (`DATABASE_URL`, `REDIS_URL`, `OLLAMA_URL`, ...) when the `APP_` form is absent
    fn apply_legacy_env(&mut self) {
        if let Some(v) = legacy_env("APP_DATABASE_URL", "DATABASE_URL") {
            self.database_url = Some(v);
        }
        if let Some(v) = legacy_env("APP_DATABASE_HOST", "DATABASE_HOST") {
            self.database_host = v;
        }
        if let Some(port) = legacy_env("APP_DATABASE_PORT", "DATABASE_PORT").and_then(|v| v.parse().ok()) {
            self.database_port = port;
        }
        if let Some(v) = legacy_env("APP_DATABASE_USER", "DATABASE_USER") {
            self.database_user = v;
        }
        if let Some(v) = legacy_env("APP_DATABASE_PASSWORD", "DATABASE_PASSWORD") {
            self.database_password = v;
        }
        if let Some(v) = legacy_env("APP_DATABASE_NAME", "DATABASE_NAME") {
            self.database_name = v;
        }
        if let Some(v) = legacy_env("APP_DATABASE_SSL_MODE", "DATABASE_SSL_MODE") {
            self.database_ssl_mode = Some(v);
        }
        if let Some(v) = legacy_env("APP_REDIS_URL", "REDIS_URL") {
            self.redis_url = Some(v);
        }
        if let Some(v) = legacy_env("APP_OLLAMA_URL", "OLLAMA_URL") {
            self.ollama_url = v;
        }
        if let Some(v) = legacy_env("APP_LLM_MODEL", "GEMMA_MODEL") {
            self.llm_model = v;
        }
        if let Some(v) = legacy_env("APP_CORS_ALLOWED_ORIGINS", "ALLOWED_ORIGINS") {
            self.cors_allowed_origins = vec![v];
        }
        if let Some(v) = legacy_env("APP_METRICS_USERNAME", "METRICS_USERNAME") {
            self.metrics_username = Some(v);
        }
        if let Some(v) = legacy_env("APP_METRICS_PASSWORD", "METRICS_PASSWORD") {
            self.metrics_password = Some(v);
        }
        if let Some(v) = legacy_env("APP_ADMIN_TOKEN", "ADMIN_TOKEN") {
            self.admin_token = Some(v);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            errors.push("DATABASE_URL cannot be empty when set");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }
        if self.metrics_username.is_some() != self.metrics_password.is_some() {
            errors.push("METRICS_USERNAME and METRICS_PASSWORD must be set together");
        }
        if self.rate_limit_requests == 0 || self.rate_limit_window_secs == 0 {
            errors.push("Rate limit requests and window must be greater than zero");
        }
        if self.admin_token.as_deref().is_some_and(|t| t.len() < 16) {
            errors.push("ADMIN_TOKEN must be at least 16 characters");
        }
        if url::Url::parse(&self.ollama_url).is_err() {
            errors.push("OLLAMA_URL must be a valid URL");
        }
        if let Err(e) = self.ssl_mode() {
            tracing::error!("{}", e);
            errors.push("DATABASE_SSL_MODE is invalid");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self.env, AppEnvironment::Production | AppEnvironment::Staging)
    }

    pub fn is_development(&self) -> bool {
        matches!(self.env, AppEnvironment::Development | AppEnvironment::Testing)
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// SSL is off for local development and required elsewhere unless overridden
    pub fn ssl_mode(&self) -> Result<PgSslMode, ConfigError> {
        match self.database_ssl_mode.as_deref() {
            Some(mode) => PgSslMode::from_str(mode)
                .map_err(|e| ConfigError::Message(format!("Invalid DATABASE_SSL_MODE '{}': {}", mode, e))),
            None if self.is_development() => Ok(PgSslMode::Disable),
            None => Ok(PgSslMode::Require),
        }
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        let ssl_mode = self.ssl_mode()?;

        match self.database_url.as_deref() {
            Some(url) => {
                let options = PgConnectOptions::from_str(url)
                    .map_err(|e| ConfigError::Message(format!("Invalid DATABASE_URL: {}", e)))?;
                // An explicit DATABASE_SSL_MODE wins over the one embedded in the URL
                Ok(match self.database_ssl_mode {
                    Some(_) => options.ssl_mode(ssl_mode),
                    None => options,
                })
            }
            None => Ok(PgConnectOptions::new()
                .host(&self.database_host)
                .port(self.database_port)
                .username(&self.database_user)
                .password(&self.database_password)
                .database(&self.database_name)
                .ssl_mode(ssl_mode)),
        }
    }

    pub fn metrics_credentials(&self) -> Option<(&str, &str)> {
        match (&self.metrics_username, &self.metrics_password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }

    /// Connection target for logs, never includes the password
    pub fn database_target(&self) -> String {
        match self.database_url.as_deref() {
            Some(url) => redact_url(url),
            None => format!(
                "postgres://{}@{}:{}/{}",
                self.database_user, self.database_host, self.database_port, self.database_name
            ),
        }
    }
}

fn legacy_env(app_key: &str, legacy_key: &str) -> Option<String> {
    if env::var(app_key).is_ok() {
        return None;
    }
    env::var(legacy_key).ok().filter(|v| !v.trim().is_empty())
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Staging => "staging",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        match self {
            Some(s) => s.as_str().redact(),
            None => "[NOT SET]",
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("database", &self.database_target())
            .field("database_password", &self.database_password.redact())
            .field("database_ssl_mode", &self.database_ssl_mode)
            .field("redis_url", &self.redis_url.as_deref().map(redact_url))
            .field("cors_allowed_origins", &self.cors_origins())
            .field("ollama_url", &self.ollama_url)
            .field("llm_model", &self.llm_model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("rate_limit_requests", &self.rate_limit_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("rate_limit_backend", &self.rate_limit_backend)
            .field("trust_x_forwarded_for", &self.trust_x_forwarded_for)
            .field("metrics_username", &self.metrics_username)
            .field("metrics_password", &self.metrics_password.redact())
            .field("admin_token", &self.admin_token.redact())
            .field("sql_guard_enabled", &self.sql_guard_enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(value: serde_json::Value) -> AppConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = config_from(serde_json::json!({}));
        assert_eq!(config.rate_limit_requests, 100);
        assert_eq!(config.rate_limit_window_secs, 60);
        assert_eq!(config.llm_timeout_secs, 60);
        assert_eq!(config.llm_model, "gemma2:2b");
        assert_eq!(config.database_max_connections, 25);
        assert_eq!(config.database_min_connections, 5);
        assert!(config.sql_guard_enabled);
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        let config = config_from(serde_json::json!({
            "env": "production",
            "cors_allowed_origins": ["*"]
        }));
        assert!(config.validate().is_err());
    }

    #[test]
    fn cors_origins_split_and_trimmed() {
        let config = config_from(serde_json::json!({
            "cors_allowed_origins": ["https://a.example, https://b.example/"]
        }));
        assert_eq!(config.cors_origins(), vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn ssl_mode_defaults_by_environment() {
        let dev = config_from(serde_json::json!({"env": "development"}));
        assert!(matches!(dev.ssl_mode().unwrap(), PgSslMode::Disable));

        let prod = config_from(serde_json::json!({"env": "production"}));
        assert!(matches!(prod.ssl_mode().unwrap(), PgSslMode::Require));

        let explicit = config_from(serde_json::json!({
            "env": "production",
            "database_ssl_mode": "verify-full"
        }));
        assert!(matches!(explicit.ssl_mode().unwrap(), PgSslMode::VerifyFull));
    }

    #[test]
    fn half_configured_metrics_credentials_rejected() {
        let config = config_from(serde_json::json!({"metrics_username": "ops"}));
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = config_from(serde_json::json!({
            "database_url": "postgres://user:s3cret@db:5432/portfolio",
            "admin_token": "an-admin-token-value",
            "metrics_username": "ops",
            "metrics_password": "m3trics"
        }));
        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("an-admin-token-value"));
        assert!(!debug.contains("m3trics"));
    }
}
