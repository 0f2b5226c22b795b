use std::{borrow::Cow, collections::HashSet};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use url::Url;
use validator::ValidationError;

/// Markup fragments that never belong in portfolio text fields
const DANGEROUS_PATTERNS: &[&str] = &[
    "<script",
    "javascript:",
    "vbscript:",
    "onload=",
    "onerror=",
    "onclick=",
    "onmouseover=",
    "<iframe",
    "<object",
    "<embed",
    "data:text/html",
];

const BLOCKED_URL_SCHEMES: &[&str] = &["javascript:", "data:", "vbscript:", "file:"];

pub const MAX_URL_LENGTH: usize = 2048;

/// Keyword fragments rejected in query strings and path segments
pub const SQL_INJECTION_PATTERNS: &[&str] = &[
    "union select",
    "union all select",
    "drop table",
    "delete from",
    "insert into",
    "update set",
    "alter table",
    "create table",
    "exec(",
    "execute(",
    "xp_cmdshell",
    "sp_executesql",
    "--",
    "/*",
    "*/",
    "waitfor delay",
    "benchmark(",
    "sleep(",
    "load_file(",
    "into outfile",
    "into dumpfile",
    "information_schema",
    "select ",
    "update ",
    "where ",
    "from ",
    "set ",
];

static CONTROL_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").expect("control character pattern is a valid regex")
});

/// `<name` openers; only the ones naming an HTML element are treated as markup
static TAG_OPENER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9\-]*)").expect("tag opener pattern is a valid regex")
});

static HTML_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "a", "abbr", "address", "applet", "area", "article", "aside", "audio", "b", "base", "bdi",
        "bdo", "blockquote", "body", "br", "button", "canvas", "caption", "center", "cite", "code",
        "col", "colgroup", "data", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt", "em",
        "embed", "fieldset", "figcaption", "figure", "font", "footer", "form", "frame", "frameset",
        "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hr", "html", "i", "iframe", "img",
        "input", "ins", "kbd", "label", "legend", "li", "link", "main", "map", "mark", "marquee",
        "math", "meta", "nav", "noembed", "noframes", "noscript", "object", "ol", "optgroup",
        "option", "p", "param", "picture", "plaintext", "pre", "q", "s", "samp", "script",
        "section", "select", "small", "source", "span", "strike", "strong", "style", "sub",
        "summary", "sup", "svg", "table", "tbody", "td", "template", "textarea", "tfoot", "th",
        "thead", "time", "title", "tr", "track", "tt", "u", "ul", "var", "video", "wbr", "xmp",
    ])
});

static CONTENT_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9_\-]*$").expect("content key pattern is a valid regex")
});

// ───── Sanitizers ───────────────────────────────────────────────────

/// Strips control characters and all HTML, dropping the bodies of script/style tags.
/// Angle brackets that do not open an HTML element (`Vec<T>`) are kept, escaped.
pub fn sanitize_text(input: &str) -> String {
    let without_controls = CONTROL_CHARS.replace_all(input, "");
    let generics_escaped = escape_non_html_openers(&without_controls);
    let cleaned = ammonia::Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(&generics_escaped)
        .to_string();
    decode_basic_entities(&cleaned).trim().to_string()
}

pub fn sanitize_optional(input: Option<String>) -> Option<String> {
    input
        .map(|s| sanitize_text(&s))
        .filter(|s| !s.is_empty())
}

pub fn sanitize_list(items: Vec<String>) -> Vec<String> {
    items
        .iter()
        .map(|s| sanitize_text(s))
        .filter(|s| !s.is_empty())
        .collect()
}

fn escape_non_html_openers(input: &str) -> Cow<'_, str> {
    TAG_OPENER.replace_all(input, |caps: &Captures| {
        if HTML_ELEMENTS.contains(caps[2].to_ascii_lowercase().as_str()) {
            caps[0].to_string()
        } else {
            format!("&lt;{}{}", &caps[1], &caps[2])
        }
    })
}

/// ammonia escapes `&`, `<` and friends in text nodes; undo the ones JSON consumers
/// would otherwise see literally. Angle brackets stay escaped.
fn decode_basic_entities(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }
    Cow::Owned(
        input
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&"),
    )
}

// ───── Predicates ───────────────────────────────────────────────────

pub fn contains_dangerous_markup(input: &str) -> bool {
    let lower = input.to_lowercase();
    DANGEROUS_PATTERNS.iter().any(|p| lower.contains(p))
}

pub fn contains_sql_injection(input: &str) -> bool {
    let lower = input.to_lowercase();
    SQL_INJECTION_PATTERNS.iter().any(|p| lower.contains(p))
}

pub fn is_safe_url(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_URL_LENGTH {
        return false;
    }
    let lower = trimmed.to_lowercase();
    if BLOCKED_URL_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        return false;
    }
    match Url::parse(trimmed) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

// ───── Validator Hooks ──────────────────────────────────────────────

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

pub fn validate_safe_text(value: &str) -> Result<(), ValidationError> {
    if contains_dangerous_markup(value) {
        return Err(validation_error("dangerous_content", "Contains potentially dangerous content"));
    }
    Ok(())
}

pub fn validate_public_url(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    if !is_safe_url(value) {
        return Err(validation_error("invalid_url", "URL must be a valid http(s) address"));
    }
    Ok(())
}

pub fn validate_content_key(value: &str) -> Result<(), ValidationError> {
    if !CONTENT_KEY.is_match(value) {
        return Err(validation_error(
            "invalid_key",
            "Key may only contain lowercase letters, digits, '-' and '_'",
        ));
    }
    Ok(())
}

pub fn validate_technologies(items: &[String]) -> Result<(), ValidationError> {
    if items.len() > 50 {
        return Err(validation_error("too_many_items", "At most 50 technologies are allowed"));
    }
    if items.iter().any(|t| t.chars().count() > 100 || contains_dangerous_markup(t)) {
        return Err(validation_error("invalid_item", "Technology names must be short plain text"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_blocks_entirely() {
        assert_eq!(sanitize_text("Hello <script>alert(1)</script>world"), "Hello world");
    }

    #[test]
    fn strips_tags_but_keeps_text() {
        assert_eq!(sanitize_text("<b>Rust</b> & <i>Go</i>"), "Rust & Go");
    }

    #[test]
    fn generic_type_parameters_survive_escaped() {
        assert_eq!(sanitize_text("Vec<T> toolkit"), "Vec&lt;T&gt; toolkit");
        assert_eq!(sanitize_text("HashMap<String, u8>"), "HashMap&lt;String, u8&gt;");
        assert_eq!(sanitize_text("<B>bold</B> Option<T>"), "bold Option&lt;T&gt;");
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(sanitize_text("line\u{0000}one\u{0007}"), "lineone");
    }

    #[test]
    fn blank_optional_becomes_none() {
        assert_eq!(sanitize_optional(Some("   ".into())), None);
    }

    #[test]
    fn detects_dangerous_markup_case_insensitively() {
        assert!(contains_dangerous_markup("<SCRIPT>x</SCRIPT>"));
        assert!(contains_dangerous_markup("<img src=x OnError=alert(1)>"));
        assert!(!contains_dangerous_markup("A plain project title"));
    }

    #[test]
    fn detects_sql_keywords() {
        assert!(contains_sql_injection("1 UNION SELECT password FROM users"));
        assert!(contains_sql_injection("1; DROP TABLE projects"));
        assert!(contains_sql_injection("abc'--"));
        assert!(!contains_sql_injection("display_order"));
        assert!(!contains_sql_injection("frontend"));
    }

    #[test]
    fn url_rules() {
        assert!(is_safe_url("https://github.com/someone/project"));
        assert!(is_safe_url("http://localhost:3000"));
        assert!(!is_safe_url("javascript:alert(1)"));
        assert!(!is_safe_url("data:text/html,<b>x</b>"));
        assert!(!is_safe_url("ftp://example.com/file"));
        assert!(!is_safe_url(&format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH))));
    }

    #[test]
    fn content_keys_are_slug_like() {
        assert!(validate_content_key("about").is_ok());
        assert!(validate_content_key("hero-banner_2").is_ok());
        assert!(validate_content_key("About Me").is_err());
    }
}
