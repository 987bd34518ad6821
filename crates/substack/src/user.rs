//! User profiles and handle redirects.
//!
//! Handles on the platform can be renamed. The old handle then answers 404,
//! while `/api/v1/users/<old>/redirect` reports the replacement. A [`User`]
//! follows such a redirect at most once per call and remembers the new handle
//! for later calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::auth::SubstackAuth;
use crate::client::{ApiClient, ClientConfig};
use crate::error::Result;
use crate::types::{Subscription, UserProfile};
use crate::utils::unwrap_envelope;

/// Redirects followed within a single profile or raw-data call.
const MAX_REDIRECTS: usize = 1;

#[derive(Debug)]
pub struct User {
    client: ApiClient,
    handle: RwLock<String>,
    original_handle: String,
    redirected: AtomicBool,
    follow_redirects: bool,
    profile: OnceCell<UserProfile>,
}

impl User {
    /// A user that follows handle redirects.
    pub fn new<S: Into<String>>(handle: S, auth: Option<Arc<SubstackAuth>>) -> Result<Self> {
        Self::with_config(handle, auth, true, ClientConfig::default())
    }

    pub fn with_config<S: Into<String>>(
        handle: S,
        auth: Option<Arc<SubstackAuth>>,
        follow_redirects: bool,
        config: ClientConfig,
    ) -> Result<Self> {
        let handle = handle.into();
        Ok(Self {
            client: ApiClient::with_config(config, auth)?,
            original_handle: handle.clone(),
            handle: RwLock::new(handle),
            redirected: AtomicBool::new(false),
            follow_redirects,
            profile: OnceCell::new(),
        })
    }

    /// The handle requests are currently made with.
    pub fn username(&self) -> String {
        self.handle.read().clone()
    }

    /// The handle this user was constructed with.
    pub fn original_username(&self) -> &str {
        &self.original_handle
    }

    pub fn was_redirected(&self) -> bool {
        self.redirected.load(Ordering::Acquire)
    }

    pub fn follows_redirects(&self) -> bool {
        self.follow_redirects
    }

    pub fn set_auth(&mut self, auth: Option<Arc<SubstackAuth>>) {
        self.client.set_auth(auth);
    }

    /// The user's profile, fetched once and cached.
    pub async fn get_profile(&self) -> Result<&UserProfile> {
        self.profile
            .get_or_try_init(|| async {
                let response = self.get_following_redirects("").await?;
                unwrap_envelope(response, &["user"])
            })
            .await
    }

    /// The unprocessed `/raw` document for the user. Not cached.
    pub async fn get_raw_data(&self) -> Result<Value> {
        self.get_following_redirects("/raw").await
    }

    pub async fn get_subscriptions(&self) -> Result<Vec<Subscription>> {
        let handle = self.username();
        let url = format!(
            "{}/subscriptions",
            self.client.config().users_endpoint(&handle)
        );

        let response: Value = self
            .client
            .get(&url)
            .await
            .map_err(|e| e.with_not_found_message(format!("User not found: {handle}")))?;

        unwrap_envelope(response, &["subscriptions"])
    }

    /// Fetch `users/<handle><suffix>`, following one handle redirect on 404.
    ///
    /// The redirect is always looked up for the original handle, so every call
    /// starts its redirect attempt from the same place.
    async fn get_following_redirects(&self, suffix: &str) -> Result<Value> {
        let mut redirects = 0;

        loop {
            let handle = self.username();
            let url = format!("{}{suffix}", self.client.config().users_endpoint(&handle));

            let err = match self.client.get::<Value>(&url).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            if !err.is_not_found() || !self.follow_redirects || redirects >= MAX_REDIRECTS {
                return Err(err);
            }
            redirects += 1;

            let Some(new_handle) = self.redirect_target().await else {
                debug!(%handle, "No redirect for handle");
                return Err(err);
            };

            info!(from = %handle, to = %new_handle, "Following handle redirect");
            *self.handle.write() = new_handle;
            self.redirected.store(true, Ordering::Release);
        }
    }

    /// Any failure of the redirect endpoint counts as "no redirect", so the
    /// caller sees the original not-found error.
    async fn redirect_target(&self) -> Option<String> {
        resolve_handle_redirect_with(&self.client, &self.original_handle).await
    }

    pub async fn id(&self) -> Result<i64> {
        Ok(self.get_profile().await?.id)
    }

    pub async fn name(&self) -> Result<&str> {
        Ok(&self.get_profile().await?.name)
    }

    pub async fn is_writer(&self) -> Result<bool> {
        Ok(self.get_profile().await?.is_writer)
    }

    pub async fn is_subscriber(&self) -> Result<bool> {
        Ok(self.get_profile().await?.is_subscriber)
    }

    pub async fn bio(&self) -> Result<Option<&str>> {
        Ok(self.get_profile().await?.bio.as_deref())
    }

    pub async fn photo_url(&self) -> Result<Option<&str>> {
        Ok(self.get_profile().await?.photo_url.as_deref())
    }

    pub async fn location(&self) -> Result<Option<&str>> {
        Ok(self.get_profile().await?.location.as_deref())
    }

    pub async fn website(&self) -> Result<Option<&str>> {
        Ok(self.get_profile().await?.website.as_deref())
    }

    pub async fn twitter_handle(&self) -> Result<Option<&str>> {
        Ok(self.get_profile().await?.twitter_screen_name.as_deref())
    }

    pub async fn subscription_count(&self) -> Result<Option<u64>> {
        Ok(self.get_profile().await?.subscription_count)
    }

    pub async fn following_count(&self) -> Result<Option<u64>> {
        Ok(self.get_profile().await?.following_count)
    }

    pub async fn follower_count(&self) -> Result<Option<u64>> {
        Ok(self.get_profile().await?.follower_count)
    }
}

async fn fetch_redirect(client: &ApiClient, handle: &str) -> Result<Option<String>> {
    let url = format!("{}/redirect", client.config().users_endpoint(handle));
    let response: Value = client.get(&url).await?;

    Ok(response
        .get("new_handle")
        .and_then(|h| h.as_str())
        .filter(|h| !h.is_empty())
        .map(ToOwned::to_owned))
}

/// Look up the current handle for `old_handle` without credentials.
///
/// Best effort: any failure, including an unreachable platform, yields `None`.
pub async fn resolve_handle_redirect(old_handle: &str) -> Option<String> {
    match ApiClient::new(None) {
        Ok(client) => resolve_handle_redirect_with(&client, old_handle).await,
        Err(e) => {
            debug!(error = %e, "Failed to create client for redirect lookup");
            None
        }
    }
}

/// Like [`resolve_handle_redirect`], using an existing client.
pub async fn resolve_handle_redirect_with(client: &ApiClient, old_handle: &str) -> Option<String> {
    fetch_redirect(client, old_handle)
        .await
        .unwrap_or_else(|e| {
            debug!(handle = old_handle, error = %e, "Redirect lookup failed");
            None
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let user = User::new("testuser", None).unwrap();
        assert_eq!(user.username(), "testuser");
        assert_eq!(user.original_username(), "testuser");
        assert!(!user.was_redirected());
        assert!(user.follows_redirects());
    }

    #[test]
    fn test_without_redirects() {
        let user = User::with_config("testuser", None, false, ClientConfig::default()).unwrap();
        assert_eq!(user.username(), "testuser");
        assert!(!user.follows_redirects());
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_profile() {
        let user = User::new("hamish", None).unwrap();
        let profile = user.get_profile().await;
        println!("{profile:?}");
    }
}
