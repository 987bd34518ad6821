use std::sync::Arc;

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::auth::SubstackAuth;
use crate::client::{ApiClient, ClientConfig};
use crate::error::{Result, SubstackError};
use crate::types::{Author, FullPost, PostMetadata, PostReactions, PostStats};
use crate::utils::{POST_SLUG_REGEX, capture_group_1, parse_url_host, unwrap_envelope};

/// A single post, addressed by `https://<name>.substack.com/p/<slug>`.
#[derive(Debug)]
pub struct Post {
    client: ApiClient,
    url: String,
    subdomain: String,
    slug: String,
    base_url: String,
    metadata: OnceCell<PostMetadata>,
}

impl Post {
    pub fn new(url: &str, auth: Option<Arc<SubstackAuth>>) -> Result<Self> {
        Self::with_config(url, auth, ClientConfig::default())
    }

    pub fn with_config(
        url: &str,
        auth: Option<Arc<SubstackAuth>>,
        config: ClientConfig,
    ) -> Result<Self> {
        let (parsed, host) = parse_url_host(url)?;

        let subdomain = match host.strip_suffix(config.domain_suffix.as_str()) {
            Some(subdomain) if !subdomain.is_empty() => subdomain,
            // custom domains: first label, e.g. `www` or `blog`
            _ => host.split('.').next().unwrap_or(host.as_str()),
        }
        .to_owned();

        let slug = capture_group_1(&POST_SLUG_REGEX, parsed.path())
            .ok_or_else(|| SubstackError::api(format!("Invalid post URL format: {url}")))?
            .to_owned();

        let base_url = config.publication_base(&subdomain);
        debug!(%subdomain, %slug, "Resolved post address");

        Ok(Self {
            client: ApiClient::with_config(config, auth)?,
            url: url.to_owned(),
            subdomain,
            slug,
            base_url,
            metadata: OnceCell::new(),
        })
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// The address this post was constructed from.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Attach credentials for paywalled content.
    pub fn set_auth(&mut self, auth: Option<Arc<SubstackAuth>>) {
        self.client.set_auth(auth);
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}/api/v1/posts/{}{suffix}", self.base_url, self.slug)
    }

    fn not_found_message(&self) -> String {
        format!("Post not found: {}", self.slug)
    }

    /// Post metadata. The first successful fetch is cached for the lifetime of
    /// this instance and never refreshed.
    pub async fn get_metadata(&self) -> Result<&PostMetadata> {
        if self.metadata.initialized() {
            debug!(slug = %self.slug, "Post metadata cache hit");
        }

        self.metadata
            .get_or_try_init(|| async {
                let response: Value = self
                    .client
                    .get(&self.endpoint(""))
                    .await
                    .map_err(|e| e.with_not_found_message(self.not_found_message()))?;
                unwrap_envelope(response, &["data", "post"])
            })
            .await
    }

    /// The post body as HTML.
    ///
    /// Paywalled posts require authenticated credentials; the check is made
    /// locally before the content endpoint is called.
    pub async fn get_content(&self) -> Result<String> {
        let metadata = self.get_metadata().await?;

        if metadata.is_paywalled && !self.client.is_authenticated() {
            return Err(SubstackError::api(
                "This post is paywalled and requires authentication",
            ));
        }

        let response: Value = self
            .client
            .get(&self.endpoint("/content"))
            .await
            .map_err(|e| e.with_not_found_message(self.not_found_message()))?;

        Ok(extract_body(response))
    }

    /// Metadata and content, fetched concurrently.
    pub async fn get_full_post(&self) -> Result<FullPost> {
        let (metadata, content) = tokio::try_join!(self.get_metadata(), self.get_content())?;

        Ok(FullPost {
            metadata: metadata.clone(),
            content,
        })
    }

    pub async fn is_paywalled(&self) -> Result<bool> {
        Ok(self.get_metadata().await?.is_paywalled)
    }

    pub async fn title(&self) -> Result<&str> {
        Ok(&self.get_metadata().await?.title)
    }

    pub async fn subtitle(&self) -> Result<Option<&str>> {
        Ok(self.get_metadata().await?.subtitle.as_deref())
    }

    pub async fn author(&self) -> Result<Option<&Author>> {
        Ok(self.get_metadata().await?.author.as_ref())
    }

    pub async fn publish_date(&self) -> Result<&str> {
        Ok(&self.get_metadata().await?.post_date)
    }

    pub async fn word_count(&self) -> Result<Option<u64>> {
        Ok(self.get_metadata().await?.word_count)
    }

    /// Estimated reading time in minutes.
    pub async fn reading_time(&self) -> Result<Option<u64>> {
        Ok(self.get_metadata().await?.reading_time_minutes)
    }

    pub async fn reactions(&self) -> Result<Option<&PostReactions>> {
        Ok(self.get_metadata().await?.reactions.as_ref())
    }

    pub async fn stats(&self) -> Result<Option<&PostStats>> {
        Ok(self.get_metadata().await?.stats.as_ref())
    }
}

/// Pull the HTML out of a content response: `body_html`, then `content`,
/// then the body itself.
fn extract_body(response: Value) -> String {
    match response {
        Value::String(body) => body,
        Value::Object(mut map) => {
            for key in ["body_html", "content"] {
                if let Some(Value::String(body)) = map.remove(key) {
                    return body;
                }
            }
            Value::Object(map).to_string()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subdomain_and_slug() {
        let post = Post::new("https://example.substack.com/p/test-post", None).unwrap();
        assert_eq!(post.subdomain(), "example");
        assert_eq!(post.slug(), "test-post");
        assert_eq!(post.url(), "https://example.substack.com/p/test-post");
        assert_eq!(post.base_url(), "https://example.substack.com");
    }

    #[test]
    fn test_custom_domain_uses_first_label() {
        let post = Post::new("https://blog.example.com/p/hello-world?utm=x", None).unwrap();
        assert_eq!(post.subdomain(), "blog");
        assert_eq!(post.slug(), "hello-world");
    }

    #[test]
    fn test_missing_slug() {
        let err = Post::new("https://example.substack.com", None).unwrap_err();
        assert_eq!(
            err.message(),
            "Invalid post URL format: https://example.substack.com"
        );
        assert!(Post::new("https://example.substack.com/archive", None).is_err());
    }

    #[test]
    fn test_invalid_url() {
        assert!(Post::new("invalid-url", None).is_err());
    }

    #[test]
    fn test_extract_body() {
        assert_eq!(extract_body(json!({"body_html": "<p>a</p>", "content": "b"})), "<p>a</p>");
        assert_eq!(extract_body(json!({"content": "<p>b</p>"})), "<p>b</p>");
        assert_eq!(extract_body(json!("<p>c</p>")), "<p>c</p>");
        assert_eq!(extract_body(json!({"other": 1})), r#"{"other":1}"#);
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_full_post() {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
        let post = Post::new("https://on.substack.com/p/grow-series", None).unwrap();
        let full_post = post.get_full_post().await;
        println!("{full_post:?}");
    }
}
