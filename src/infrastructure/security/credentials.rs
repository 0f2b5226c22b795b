use base64::{engine::general_purpose::STANDARD, Engine as _};
use zeroize::Zeroizing;

/// Compares two secrets without short-circuiting on the first differing byte
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut diff = (a.len() ^ b.len()) as u8;
    for (i, byte) in a.iter().enumerate() {
        let other = b.get(i).copied().unwrap_or(0);
        diff |= byte ^ other;
    }
    diff == 0 && a.len() == b.len()
}

/// Decoded `Authorization: Basic` credentials, wiped from memory on drop
pub struct BasicCredentials {
    pub username: Zeroizing<String>,
    pub password: Zeroizing<String>,
}

pub fn parse_basic_auth(header: &str) -> Option<BasicCredentials> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = Zeroizing::new(STANDARD.decode(encoded.trim()).ok()?);
    let text = std::str::from_utf8(&decoded).ok()?;
    let (username, password) = text.split_once(':')?;

    Some(BasicCredentials {
        username: Zeroizing::new(username.to_string()),
        password: Zeroizing::new(password.to_string()),
    })
}

pub fn parse_bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_secrets_match() {
        assert!(constant_time_eq(b"s3cret", b"s3cret"));
        assert!(!constant_time_eq(b"s3cret", b"s3cres"));
        assert!(!constant_time_eq(b"s3cret", b"s3cret-longer"));
        assert!(!constant_time_eq(b"", b"x"));
    }

    #[test]
    fn parses_basic_header() {
        // "ops:pa:ss" keeps everything after the first colon as the password
        let header = format!("Basic {}", STANDARD.encode("ops:pa:ss"));
        let creds = parse_basic_auth(&header).unwrap();
        assert_eq!(creds.username.as_str(), "ops");
        assert_eq!(creds.password.as_str(), "pa:ss");
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(parse_basic_auth("Bearer abc").is_none());
        assert!(parse_basic_auth("Basic !!!not-base64").is_none());
    }

    #[test]
    fn parses_bearer_header() {
        assert_eq!(parse_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(parse_bearer_token("bearer abc123"), Some("abc123"));
        assert_eq!(parse_bearer_token("Bearer"), None);
        assert_eq!(parse_bearer_token("Token abc123"), None);
    }
}
