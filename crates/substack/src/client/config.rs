use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("substack-api-rs/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_API_ROOT: &str = "https://substack.com";
pub const DEFAULT_DOMAIN_SUFFIX: &str = ".substack.com";

const JSON_MIME: &str = "application/json";

/// Transport settings shared by every request an [`ApiClient`](super::ApiClient) makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub accept: String,
    pub content_type: String,
    /// Root of the platform-wide API, used for user lookups.
    pub api_root: String,
    /// Hostname suffix that identifies a hosted publication, e.g. `.substack.com`.
    pub domain_suffix: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            accept: JSON_MIME.to_owned(),
            content_type: JSON_MIME.to_owned(),
            api_root: DEFAULT_API_ROOT.to_owned(),
            domain_suffix: DEFAULT_DOMAIN_SUFFIX.to_owned(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_api_root<S: Into<String>>(mut self, api_root: S) -> Self {
        self.api_root = api_root.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_domain_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.domain_suffix = suffix.into();
        self
    }

    /// Canonical address of a hosted publication.
    pub fn publication_base(&self, subdomain: &str) -> String {
        format!("https://{subdomain}{}", self.domain_suffix)
    }

    pub(crate) fn users_endpoint(&self, handle: &str) -> String {
        format!("{}/api/v1/users/{handle}", self.api_root)
    }
}
