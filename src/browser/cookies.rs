// Netscape cookie file parsing (the format browser export extensions write).
//
// Each cookie line is seven tab-separated fields:
//   domain  include-subdomains  path  secure  expiration  name  value
// Lines starting with `#` are comments, except `#HttpOnly_` which prefixes a
// cookie that is HTTP-only.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    /// Unix timestamp; `None` for session cookies.
    pub expires: Option<i64>,
    pub name: String,
    pub value: String,
    pub http_only: bool,
}

/// Parse the contents of a cookie file. Malformed lines are skipped.
pub fn parse_netscape(text: &str) -> Vec<Cookie> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let cookie = parse_line(line);
            if cookie.is_none() && !is_ignorable(line) {
                debug!(line = i + 1, "Skipping malformed cookie line");
            }
            cookie
        })
        .collect()
}

/// Read and parse a cookie file.
pub fn load_cookies(path: &Path) -> Result<Vec<Cookie>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cookie file {}", path.display()))?;
    Ok(parse_netscape(&text))
}

fn is_ignorable(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || (line.starts_with('#') && !line.starts_with(HTTP_ONLY_PREFIX))
}

fn parse_line(line: &str) -> Option<Cookie> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (line, http_only) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
        Some(rest) => (rest, true),
        None if is_ignorable(line) => return None,
        None => (line, false),
    };

    let fields: Vec<&str> = line.split('\t').collect();
    let [domain, include_subdomains, path, secure, expiration, name, value] = fields[..] else {
        return None;
    };

    let expiration = expiration.trim();
    let expires = if !expiration.is_empty() && expiration.chars().all(|c| c.is_ascii_digit()) {
        expiration.parse::<i64>().ok()
    } else {
        None
    };

    Some(Cookie {
        domain: domain.trim().to_string(),
        include_subdomains: flag(include_subdomains),
        path: path.trim().to_string(),
        secure: flag(secure),
        expires,
        name: name.trim().to_string(),
        value: value.to_string(),
        http_only,
    })
}

fn flag(field: &str) -> bool {
    field.trim().eq_ignore_ascii_case("TRUE")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_only_prefix_is_a_cookie_not_a_comment() {
        let text = "#HttpOnly_.linkedin.com\tTRUE\t/\tTRUE\t1999999999\tli_at\tsecret";
        let cookies = parse_netscape(text);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].http_only);
        assert_eq!(cookies[0].domain, ".linkedin.com");
        assert_eq!(cookies[0].expires, Some(1_999_999_999));
    }

    #[test]
    fn zero_expiry_is_kept_as_an_epoch() {
        let cookies = parse_netscape("a.com\tFALSE\t/\tFALSE\t0\tk\tv");
        assert_eq!(cookies[0].expires, Some(0));
        assert!(!cookies[0].include_subdomains);
    }
}
