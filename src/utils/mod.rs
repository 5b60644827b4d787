//! # Utilities
//!
//! Token generation, long-URL validation and short-URL formatting.

use rand::Rng;

/// Length of every generated token.
pub const TOKEN_LENGTH: usize = 6;

/// Longest accepted long URL, in bytes.
pub const MAX_URL_LENGTH: usize = 2048;

/// Schemes a long URL may use.
pub const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp"];

// =====================================
// Token Generation
// =====================================
/// Source of fresh short tokens.
///
/// Tokens are not unique by construction; uniqueness is enforced by the
/// store, and the engine regenerates on a collision.
#[cfg_attr(test, mockall::automock)]
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Draws each character independently from the thread-local CSPRNG.
///
/// ```rust
/// use shortlink::utils::{HexTokenGenerator, TokenGenerator, TOKEN_LENGTH};
///
/// let token = HexTokenGenerator::default().generate();
/// assert_eq!(token.len(), TOKEN_LENGTH);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HexTokenGenerator {
    length: usize,
}

impl HexTokenGenerator {
    #[must_use]
    pub fn with_length(length: usize) -> Self {
        Self { length }
    }
}

impl Default for HexTokenGenerator {
    fn default() -> Self {
        Self::with_length(TOKEN_LENGTH)
    }
}

impl TokenGenerator for HexTokenGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| char::from_digit(rng.gen_range(0..16), 16).unwrap_or('0'))
            .collect()
    }
}

/// Takes the leading characters of a random v4 UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTokenGenerator;

impl TokenGenerator for UuidTokenGenerator {
    fn generate(&self) -> String {
        let mut token = uuid::Uuid::new_v4().simple().to_string();
        token.truncate(TOKEN_LENGTH);
        token
    }
}

/// True when `token` has the shape of a generated token.
#[must_use]
pub fn is_token_shaped(token: &str) -> bool {
    token.len() == TOKEN_LENGTH
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

// =====================================
// URL Validation
// =====================================
/// Checks that `long_url` is an absolute URL worth shortening.
///
/// # Errors
/// Returns a human-readable reason when the URL is empty, too long, contains
/// whitespace or control characters, is not absolute, uses an unsupported
/// scheme, or has no host.
pub fn validate_long_url(long_url: &str) -> Result<(), String> {
    if long_url.trim().is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    if long_url.len() > MAX_URL_LENGTH {
        return Err(format!("URL is longer than {MAX_URL_LENGTH} bytes"));
    }

    // `Url::parse` strips these silently; stored verbatim they cannot become
    // a Location header.
    if long_url.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("URL cannot contain whitespace or control characters".to_string());
    }

    let parsed = url::Url::parse(long_url).map_err(|e| format!("{long_url}: {e}"))?;

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(format!("unsupported scheme '{}'", parsed.scheme()));
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(format!("{long_url}: missing host"));
    }

    Ok(())
}

/// `{base_url}{token}`; `base_url` is expected to end with `/`.
#[must_use]
pub fn short_url(base_url: &str, token: &str) -> String {
    format!("{base_url}{token}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn accepts(long_url: &str) -> bool {
        validate_long_url(long_url).is_ok()
    }

    #[test]
    fn test_hex_tokens_have_the_right_shape() {
        let generator = HexTokenGenerator::default();
        for _ in 0..1_000 {
            let token = generator.generate();
            assert!(is_token_shaped(&token), "bad token {token}");
        }
    }

    #[test]
    fn test_uuid_tokens_have_the_right_shape() {
        let generator = UuidTokenGenerator;
        for _ in 0..1_000 {
            let token = generator.generate();
            assert!(is_token_shaped(&token), "bad token {token}");
        }
    }

    #[test]
    fn test_tokens_vary() {
        let generator = HexTokenGenerator::default();
        let tokens: HashSet<String> = (0..100).map(|_| generator.generate()).collect();
        // 100 draws from 16^6 values; a handful of repeats would be astonishing
        assert!(tokens.len() > 95);
    }

    #[test]
    fn test_token_shape() {
        assert!(is_token_shaped("0a9fbc"));
        assert!(!is_token_shaped("0A9FBC"));
        assert!(!is_token_shaped("abc12"));
        assert!(!is_token_shaped("abcdefg"));
        assert!(!is_token_shaped("xyz123"));
    }

    #[test]
    fn test_valid_urls() {
        assert!(accepts("http://example.com"));
        assert!(accepts("https://sub.example.com/path?q=1#frag"));
        assert!(accepts("ftp://files.example.com/a.txt"));
        assert!(accepts("http://localhost:8080/"));
    }

    #[test]
    fn test_invalid_urls() {
        assert!(!accepts(""));
        assert!(!accepts("   "));
        assert!(!accepts("not a url"));
        assert!(!accepts("example.com"));
        assert!(!accepts("mailto:someone@example.com"));
        assert!(!accepts("javascript:alert(1)"));
        assert!(!accepts(&format!("http://example.com/{}", "a".repeat(MAX_URL_LENGTH))));
    }

    #[test]
    fn test_whitespace_and_control_characters_are_rejected() {
        for bad in [
            "http://example.com/a\nb",
            "http://example.com/a\tb",
            "http://example.com/a b",
            " http://example.com",
            "http://example.com/ ",
            "http://example.com/\u{7f}",
            "http://example.com/\r",
        ] {
            assert!(validate_long_url(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_short_url() {
        assert_eq!(short_url("http://localhost:8080/", "abc123"), "http://localhost:8080/abc123");
    }
}
