use crate::{
    cli::{NewsletterAction, OutputFormat, Paging},
    config::AppConfig,
    output::OutputManager,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::{path::Path, sync::Arc, time::Duration};
use substack_api::{
    ApiClient, ClientConfig, Newsletter, Post, RequestOptions, SubstackAuth, User,
    resolve_handle_redirect_with,
};
use tracing::{debug, warn};

pub struct CommandExecutor {
    config: AppConfig,
    client_config: ClientConfig,
    auth: Option<Arc<SubstackAuth>>,
    output: OutputManager,
    format: OutputFormat,
}

impl CommandExecutor {
    pub fn new(
        config: AppConfig,
        cookies: Option<&Path>,
        cookie_string: Option<&str>,
        timeout: Option<u64>,
        format: OutputFormat,
    ) -> anyhow::Result<Self> {
        let mut client_config = config.client_config();
        if let Some(secs) = timeout {
            client_config = client_config.with_timeout(Duration::from_secs(secs));
        }

        let auth = load_auth(cookies, cookie_string, config.cookies_path.as_deref())?
            .map(Arc::new);

        Ok(Self {
            config,
            client_config,
            auth,
            output: OutputManager::new(format == OutputFormat::Pretty),
            format,
        })
    }

    pub async fn newsletter(
        &self,
        url: &str,
        action: Option<NewsletterAction>,
        paging: Paging,
    ) -> anyhow::Result<()> {
        let newsletter = Newsletter::with_config(url, self.auth.clone(), self.client_config.clone())?;
        debug!(
            subdomain = newsletter.subdomain(),
            base_url = newsletter.base_url(),
            "Resolved newsletter"
        );

        let options = RequestOptions::new()
            .limit(paging.limit)
            .offset(paging.offset)
            .sorting(paging.sort.into());

        let action = action.unwrap_or(NewsletterAction::Posts);
        let pb = self.spinner(&format!("Fetching from {}...", newsletter.base_url()));

        let rendered = match action {
            NewsletterAction::Posts => {
                let posts = newsletter.get_posts(&options).await;
                finish(pb);
                let posts = posts?;
                self.render(&posts, || self.output.format_posts("Posts", &posts))?
            }
            NewsletterAction::Search { query } => {
                let result = newsletter.search_posts(&query, &options).await;
                finish(pb);
                let result = result?;
                self.render(&result, || self.output.format_search(&query, &result))?
            }
            NewsletterAction::Podcasts => {
                let episodes = newsletter.get_podcasts(&options).await;
                finish(pb);
                let episodes = episodes?;
                self.render(&episodes, || self.output.format_podcasts(&episodes))?
            }
            NewsletterAction::Recommendations => {
                let recommendations = newsletter.get_recommendations(&options).await;
                finish(pb);
                let recommendations = recommendations?;
                self.render(&recommendations, || {
                    self.output.format_recommendations(&recommendations)
                })?
            }
            NewsletterAction::Authors => {
                let authors = newsletter.get_authors().await;
                finish(pb);
                let authors = authors?;
                self.render(&authors, || self.output.format_authors(&authors))?
            }
            NewsletterAction::Metadata => {
                let metadata = newsletter.get_metadata().await;
                finish(pb);
                let metadata = metadata?;
                self.render(metadata, || self.output.format_newsletter(metadata))?
            }
        };

        print!("{rendered}");
        Ok(())
    }

    pub async fn post(&self, url: &str, content: bool, full: bool) -> anyhow::Result<()> {
        let post = Post::with_config(url, self.auth.clone(), self.client_config.clone())?;
        let pb = self.spinner(&format!("Fetching post {}...", post.slug()));

        let rendered = if full {
            let full_post = post.get_full_post().await;
            finish(pb);
            let full_post = full_post?;
            self.render(&full_post, || self.output.format_full_post(&full_post))?
        } else if content {
            let body = post.get_content().await;
            finish(pb);
            let body = body?;
            match self.format {
                OutputFormat::Json => self.output.json(&serde_json::json!({ "content": body }))?,
                OutputFormat::Pretty => format!("{body}\n"),
            }
        } else {
            let metadata = post.get_metadata().await;
            finish(pb);
            let metadata = metadata?;
            self.render(metadata, || self.output.format_post(metadata))?
        };

        print!("{rendered}");
        Ok(())
    }

    pub async fn user(
        &self,
        handle: &str,
        raw: bool,
        subscriptions: bool,
        no_redirects: bool,
    ) -> anyhow::Result<()> {
        let follow_redirects = self.config.follow_redirects && !no_redirects;
        let user = User::with_config(
            handle,
            self.auth.clone(),
            follow_redirects,
            self.client_config.clone(),
        )?;
        let pb = self.spinner(&format!("Looking up @{handle}..."));

        let rendered = if subscriptions {
            let list = user.get_subscriptions().await;
            finish(pb);
            let list = list?;
            self.render(&list, || self.output.format_subscriptions(handle, &list))?
        } else if raw {
            let data = user.get_raw_data().await;
            finish(pb);
            // Raw documents have no pretty form.
            self.output.json(&data?)?
        } else {
            let profile = user.get_profile().await;
            finish(pb);
            let profile = profile?;
            let original = user.was_redirected().then(|| user.original_username());
            self.render(profile, || self.output.format_profile(profile, original))?
        };

        print!("{rendered}");
        Ok(())
    }

    pub async fn resolve(&self, handle: &str) -> anyhow::Result<()> {
        let client = ApiClient::with_config(self.client_config.clone(), self.auth.clone())?;
        let resolved = resolve_handle_redirect_with(&client, handle).await;

        let rendered = match self.format {
            OutputFormat::Json => self.output.json(&serde_json::json!({
                "handle": handle,
                "new_handle": resolved,
            }))?,
            OutputFormat::Pretty => self.output.format_resolved(handle, resolved.as_deref()),
        };
        print!("{rendered}");
        Ok(())
    }

    fn render<T, F>(&self, value: &T, pretty: F) -> anyhow::Result<String>
    where
        T: serde::Serialize + ?Sized,
        F: FnOnce() -> String,
    {
        match self.format {
            OutputFormat::Json => self.output.json(value),
            OutputFormat::Pretty => Ok(pretty()),
        }
    }

    fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if self.format != OutputFormat::Pretty {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            pb.set_style(style.tick_strings(&[
                "▹▹▹▹▹", "▸▹▹▹▹", "▹▸▹▹▹", "▹▹▸▹▹", "▹▹▹▸▹", "▹▹▹▹▸", "▪▪▪▪▪",
            ]));
        }
        pb.set_message(message.to_string());
        Some(pb)
    }
}

/// Credentials from a cookie header string, or from a JSON cookie file given on
/// the command line or in the config file, in that order.
fn load_auth(
    cookies: Option<&Path>,
    cookie_string: Option<&str>,
    config_path: Option<&Path>,
) -> anyhow::Result<Option<SubstackAuth>> {
    let (auth, source) = if let Some(header) = cookie_string {
        (SubstackAuth::from_cookie_string(header), "cookie string".to_string())
    } else if let Some(path) = cookies.or(config_path) {
        (SubstackAuth::from_file(path)?, path.display().to_string())
    } else {
        return Ok(None);
    };

    if !auth.is_authenticated() {
        warn!(%source, "No session cookie found, requests will be anonymous");
    }
    Ok(Some(auth))
}

fn finish(pb: Option<ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}
