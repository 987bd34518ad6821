//! Cookie-based credentials for paywalled content.
//!
//! A [`SubstackAuth`] holds the cookies exported from a logged-in browser
//! session and renders them into a `Cookie` header value. The store is built
//! once and never mutated, so it can be shared between resolvers behind an
//! `Arc`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SubstackError};

/// Name of the session cookie that marks a store as authenticated.
pub const SESSION_COOKIE: &str = "substack.sid";

const DEFAULT_COOKIE_DOMAIN: &str = ".substack.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// A single browser cookie, in the shape browser cookie exporters emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
}

impl Cookie {
    /// A secure cookie scoped to the whole platform domain.
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: DEFAULT_COOKIE_DOMAIN.to_owned(),
            path: "/".to_owned(),
            secure: true,
            http_only: None,
            same_site: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstackAuth {
    cookies: Vec<Cookie>,
}

impl SubstackAuth {
    /// An empty store. Requests made with it carry no `Cookie` header.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cookies(cookies: Vec<Cookie>) -> Self {
        Self { cookies }
    }

    /// Load cookies from a JSON array of cookie records.
    ///
    /// Fails if the file cannot be read or is not a valid cookie array; no
    /// partially loaded store is ever returned.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |cause: &dyn std::fmt::Display| {
            SubstackError::api(format!(
                "Failed to load cookies from {}: {}",
                path.display(),
                cause
            ))
        };

        let data = std::fs::read_to_string(path).map_err(|e| load_error(&e))?;
        let cookies: Vec<Cookie> = serde_json::from_str(&data).map_err(|e| load_error(&e))?;
        debug!(path = %path.display(), count = cookies.len(), "Loaded cookies");

        Ok(Self { cookies })
    }

    /// Build a store from a `Cookie` header style string, e.g.
    /// `"substack.sid=abc; substack.lli=1"`.
    ///
    /// Accepts `;` and newline separators; segments without a name or value
    /// are skipped.
    pub fn from_cookie_string(cookie_string: &str) -> Self {
        let cookies = cookie_string
            .split(&[';', '\n'][..])
            .map(str::trim)
            .filter_map(|part| part.split_once('='))
            .map(|(name, value)| (name.trim(), value.trim()))
            .filter(|(name, value)| !name.is_empty() && !value.is_empty())
            .map(|(name, value)| Cookie::new(name, value))
            .collect();

        Self { cookies }
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Render the held cookies as a `Cookie` header value, in insertion order.
    pub fn cookie_header(&self) -> String {
        let mut cookie_string = String::with_capacity(
            self.cookies
                .iter()
                .map(|c| c.name.len() + 1 + c.value.len() + 2)
                .sum(),
        );

        for cookie in &self.cookies {
            if !cookie_string.is_empty() {
                cookie_string.push_str("; ");
            }
            cookie_string.push_str(&cookie.name);
            cookie_string.push('=');
            cookie_string.push_str(&cookie.value);
        }

        cookie_string
    }

    pub fn is_authenticated(&self) -> bool {
        self.cookies.iter().any(|c| c.name == SESSION_COOKIE)
    }
}
