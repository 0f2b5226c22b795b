use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static CREDENTIAL_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(password|passwd|pwd|token|secret|api_key)=([^\s&;]+)")
        .expect("credential pattern is a valid regex")
});

/// Masks the password component of a connection URL
pub fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() && url.set_password(Some("****")).is_err() {
                return "[REDACTED]".to_string();
            }
            url.to_string()
        }
        Err(_) => "[UNPARSEABLE URL]".to_string(),
    }
}

/// Masks `key=value` credentials inside free text such as driver error messages
pub fn redact_text(text: &str) -> String {
    CREDENTIAL_PAIR.replace_all(text, "$1=****").into_owned()
}
