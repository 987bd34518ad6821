use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::{Result, SubstackError};

/// Matches the `/p/<slug>` segment of a post address.
pub static POST_SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/p/([^/?#]+)").unwrap());

#[inline]
pub fn capture_group_1<'a>(re: &Regex, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse an absolute address and return it together with its lowercase host.
pub fn parse_url_host(input: &str) -> Result<(Url, String)> {
    let invalid = || SubstackError::api(format!("Invalid URL format: {input}"));
    let url = Url::parse(input).map_err(|_| invalid())?;
    let host = url.host_str().filter(|h| !h.is_empty()).ok_or_else(invalid)?;
    let host = host.to_ascii_lowercase();
    Ok((url, host))
}

/// Decode the first non-null `keys` member of `value`, or `value` itself when
/// the endpoint answered without an envelope.
pub fn unwrap_envelope<T: DeserializeOwned>(mut value: Value, keys: &[&str]) -> Result<T> {
    let wrapped = keys
        .iter()
        .find_map(|key| value.get_mut(*key).filter(|v| !v.is_null()).map(Value::take));
    let inner = wrapped.unwrap_or(value);

    serde_json::from_value(inner)
        .map_err(|e| SubstackError::api(format!("Invalid response body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_slug_regex() {
        assert_eq!(
            capture_group_1(&POST_SLUG_REGEX, "/p/test-post"),
            Some("test-post")
        );
        assert_eq!(
            capture_group_1(&POST_SLUG_REGEX, "/p/test-post/comments"),
            Some("test-post")
        );
        assert_eq!(capture_group_1(&POST_SLUG_REGEX, "/archive"), None);
        assert_eq!(capture_group_1(&POST_SLUG_REGEX, "/p/"), None);
    }

    #[test]
    fn test_parse_url_host() {
        let (_, host) = parse_url_host("https://Example.Substack.com/p/x").unwrap();
        assert_eq!(host, "example.substack.com");

        assert!(parse_url_host("invalid-url").is_err());
        assert!(parse_url_host("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_unwrap_envelope() {
        let wrapped: Vec<u32> = unwrap_envelope(json!({"posts": [1, 2]}), &["posts"]).unwrap();
        assert_eq!(wrapped, vec![1, 2]);

        let bare: Vec<u32> = unwrap_envelope(json!([3]), &["posts"]).unwrap();
        assert_eq!(bare, vec![3]);

        let second_key: u32 = unwrap_envelope(json!({"data": null, "post": 4}), &["data", "post"]).unwrap();
        assert_eq!(second_key, 4);

        let err = unwrap_envelope::<Vec<u32>>(json!({"posts": "nope"}), &["posts"]).unwrap_err();
        assert!(err.message().starts_with("Invalid response body"));
    }
}
