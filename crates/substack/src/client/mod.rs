//! The request gateway.
//!
//! Every outbound call made by the resolvers goes through [`ApiClient`]. It
//! attaches the session cookies when the held credentials are authenticated
//! and turns non-success responses into a [`SubstackError`].

mod config;

pub use config::{
    ClientConfig, DEFAULT_API_ROOT, DEFAULT_DOMAIN_SUFFIX, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};

use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::SubstackAuth;
use crate::error::{Result, SubstackError};

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
    auth: Option<Arc<SubstackAuth>>,
}

impl ApiClient {
    pub fn new(auth: Option<Arc<SubstackAuth>>) -> Result<Self> {
        Self::with_config(ClientConfig::default(), auth)
    }

    pub fn with_config(config: ClientConfig, auth: Option<Arc<SubstackAuth>>) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(header::USER_AGENT, header_value(&config.user_agent)?);
        default_headers.insert(header::ACCEPT, header_value(&config.accept)?);
        default_headers.insert(header::CONTENT_TYPE, header_value(&config.content_type)?);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| SubstackError::api(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            auth,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn auth(&self) -> Option<&Arc<SubstackAuth>> {
        self.auth.as_ref()
    }

    /// Replace the attached credentials. Other clients sharing the previous
    /// store are unaffected.
    pub fn set_auth(&mut self, auth: Option<Arc<SubstackAuth>>) {
        self.auth = auth;
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.as_deref().is_some_and(SubstackAuth::is_authenticated)
    }

    /// Fetch `url` and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.execute(self.request(Method::GET, url)?).await
    }

    /// Fetch `url` with `query` appended as URL parameters and decode the JSON body.
    pub async fn get_with_query<T, Q>(&self, url: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(self.request(Method::GET, url)?.query(query))
            .await
    }

    /// Send `body` as JSON to `url` and decode the JSON response.
    pub async fn post<T, B>(&self, url: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.request(Method::POST, url)?.json(body))
            .await
    }

    /// Start a request, attaching the session cookies when authenticated.
    /// Cookies that cannot form a valid header fail the request instead of
    /// sending it anonymously.
    fn request(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let authenticated = self.is_authenticated();
        debug!(%method, url, authenticated, "Sending request");

        let builder = self.client.request(method, url);
        let Some(auth) = self.auth.as_deref().filter(|_| authenticated) else {
            return Ok(builder);
        };

        let value = HeaderValue::from_str(&auth.cookie_header())
            .map_err(|e| SubstackError::api(format!("Invalid cookie header: {e}")))?;
        Ok(builder.header(header::COOKIE, value))
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await.map_err(SubstackError::network)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(SubstackError::network)?;

        if (200..400).contains(&status) {
            return serde_json::from_str(&body)
                .map_err(|e| SubstackError::api(format!("Invalid response body: {e}")));
        }

        let err = classify_status(status, &body);
        debug!(status, error = %err, "Request failed");
        Err(err)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| SubstackError::api(format!("Invalid header value {value:?}: {e}")))
}

/// Message the server put in an error body, if the body is JSON with a
/// non-empty `message` string.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(ToOwned::to_owned)
}

/// Map a failed HTTP status and its body onto the error taxonomy.
pub(crate) fn classify_status(status: u16, body: &str) -> SubstackError {
    let message = server_message(body);
    match status {
        401 => SubstackError::authentication(
            message.unwrap_or_else(|| "Authentication required".to_owned()),
        ),
        404 => SubstackError::not_found(message.unwrap_or_else(|| "Resource not found".to_owned())),
        429 => {
            SubstackError::rate_limit(message.unwrap_or_else(|| "Rate limit exceeded".to_owned()))
        }
        _ => SubstackError::api_with_status(
            message.unwrap_or_else(|| format!("HTTP {status} error")),
            status,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Cookie;
    use crate::error::ErrorKind;

    #[test]
    fn test_classify_known_statuses() {
        assert_eq!(classify_status(401, "").kind(), ErrorKind::Authentication);
        assert_eq!(classify_status(404, "").kind(), ErrorKind::NotFound);
        assert_eq!(classify_status(429, "").kind(), ErrorKind::RateLimit);

        assert_eq!(classify_status(401, "").message(), "Authentication required");
        assert_eq!(classify_status(404, "").message(), "Resource not found");
        assert_eq!(classify_status(429, "").message(), "Rate limit exceeded");
    }

    #[test]
    fn test_classify_other_statuses() {
        let err = classify_status(500, "<html>oops</html>");
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.message(), "HTTP 500 error");

        let err = classify_status(403, r#"{"message": "Forbidden for this user"}"#);
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.message(), "Forbidden for this user");
    }

    #[test]
    fn test_server_message_is_preferred() {
        let err = classify_status(404, r#"{"message": "No such post"}"#);
        assert_eq!(err, SubstackError::not_found("No such post"));

        let err = classify_status(429, r#"{"message": ""}"#);
        assert_eq!(err.message(), "Rate limit exceeded");
    }

    #[test]
    fn test_set_auth_replaces_reference_only() {
        let shared = Arc::new(SubstackAuth::from_cookies(vec![Cookie::new(
            "substack.sid",
            "abc",
        )]));
        let mut a = ApiClient::new(Some(shared.clone())).unwrap();
        let b = ApiClient::new(Some(shared.clone())).unwrap();

        a.set_auth(None);
        assert!(!a.is_authenticated());
        assert!(b.is_authenticated());
        assert!(shared.is_authenticated());
    }
}
