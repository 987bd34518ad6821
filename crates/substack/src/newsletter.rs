use std::sync::Arc;

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::auth::SubstackAuth;
use crate::client::{ApiClient, ClientConfig};
use crate::error::Result;
use crate::types::{
    Author, NewsletterMetadata, PodcastEpisode, PostMetadata, Recommendation, RequestOptions,
    SearchResult,
};
use crate::utils::{parse_url_host, unwrap_envelope};

/// A publication, addressed either by its `<name>.substack.com` host or by a
/// custom domain.
#[derive(Debug)]
pub struct Newsletter {
    client: ApiClient,
    subdomain: String,
    custom_domain: Option<String>,
    base_url: String,
    metadata: OnceCell<NewsletterMetadata>,
}

impl Newsletter {
    pub fn new(url: &str, auth: Option<Arc<SubstackAuth>>) -> Result<Self> {
        Self::with_config(url, auth, ClientConfig::default())
    }

    pub fn with_config(
        url: &str,
        auth: Option<Arc<SubstackAuth>>,
        config: ClientConfig,
    ) -> Result<Self> {
        let (_, host) = parse_url_host(url)?;

        let (subdomain, custom_domain, base_url) =
            match host.strip_suffix(config.domain_suffix.as_str()) {
                Some(subdomain) if !subdomain.is_empty() => {
                    let base_url = config.publication_base(subdomain);
                    (subdomain.to_owned(), None, base_url)
                }
                _ => {
                    let base_url = format!("https://{host}");
                    (host.clone(), Some(base_url.clone()), base_url)
                }
            };
        debug!(%subdomain, %base_url, "Resolved newsletter address");

        Ok(Self {
            client: ApiClient::with_config(config, auth)?,
            subdomain,
            custom_domain,
            base_url,
            metadata: OnceCell::new(),
        })
    }

    /// Send every request to `base_url` instead of the address derived from
    /// the constructor URL.
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// The `<name>` of `<name>.substack.com`, or the full host for custom domains.
    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    pub fn custom_domain(&self) -> Option<&str> {
        self.custom_domain.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn set_auth(&mut self, auth: Option<Arc<SubstackAuth>>) {
        self.client.set_auth(auth);
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.base_url)
    }

    fn paging(options: &RequestOptions) -> Vec<(&'static str, String)> {
        vec![
            ("limit", options.limit.to_string()),
            ("offset", options.offset.to_string()),
        ]
    }

    /// Recent posts, newest first unless `options.sorting` says otherwise.
    pub async fn get_posts(&self, options: &RequestOptions) -> Result<Vec<PostMetadata>> {
        let mut params = Self::paging(options);
        params.push(("sort", options.sorting.to_string()));

        let response: Value = self
            .client
            .get_with_query(&self.endpoint("posts"), &params)
            .await
            .map_err(|e| {
                e.with_not_found_message(format!("Newsletter not found: {}", self.base_url))
            })?;

        unwrap_envelope(response, &["posts"])
    }

    pub async fn search_posts(&self, query: &str, options: &RequestOptions) -> Result<SearchResult> {
        let mut params = vec![("q", query.to_owned())];
        params.extend(Self::paging(options));

        self.client
            .get_with_query(&self.endpoint("posts/search"), &params)
            .await
            .map_err(|e| {
                e.with_not_found_message(format!("Newsletter not found: {}", self.base_url))
            })
    }

    pub async fn get_podcasts(&self, options: &RequestOptions) -> Result<Vec<PodcastEpisode>> {
        let response: Value = self
            .client
            .get_with_query(&self.endpoint("podcasts"), &Self::paging(options))
            .await
            .map_err(|e| {
                e.with_not_found_message(format!("Podcasts not found for {}", self.base_url))
            })?;

        unwrap_envelope(response, &["podcasts"])
    }

    pub async fn get_recommendations(
        &self,
        options: &RequestOptions,
    ) -> Result<Vec<Recommendation>> {
        let response: Value = self
            .client
            .get_with_query(&self.endpoint("recommendations"), &Self::paging(options))
            .await
            .map_err(|e| {
                e.with_not_found_message(format!("Recommendations not found for {}", self.base_url))
            })?;

        unwrap_envelope(response, &["recommendations"])
    }

    pub async fn get_authors(&self) -> Result<Vec<Author>> {
        let response: Value = self
            .client
            .get(&self.endpoint("authors"))
            .await
            .map_err(|e| {
                e.with_not_found_message(format!("Authors not found for {}", self.base_url))
            })?;

        unwrap_envelope(response, &["authors"])
    }

    /// Publication metadata. Fetched once per instance and reused afterwards.
    pub async fn get_metadata(&self) -> Result<&NewsletterMetadata> {
        self.metadata
            .get_or_try_init(|| async {
                debug!(base_url = %self.base_url, "Fetching newsletter metadata");
                let response: Value = self
                    .client
                    .get(&self.endpoint("publication"))
                    .await
                    .map_err(|e| {
                        e.with_not_found_message(format!(
                            "Newsletter not found: {}",
                            self.base_url
                        ))
                    })?;
                unwrap_envelope(response, &["publication"])
            })
            .await
    }
}
