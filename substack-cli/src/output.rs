use colored::*;
use serde::Serialize;
use substack_api::{
    Author, FullPost, NewsletterMetadata, PodcastEpisode, PostMetadata, Recommendation,
    SearchResult, Subscription, UserProfile,
};

enum Color {
    Green,
    Yellow,
    Blue,
    Cyan,
}

pub struct OutputManager {
    colored: bool,
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    pub fn format_posts(&self, heading: &str, posts: &[PostMetadata]) -> String {
        let mut output = self.heading(&format!("{heading} ({})", posts.len()));
        for post in posts {
            output.push_str(&self.post_line(post));
        }
        output
    }

    pub fn format_search(&self, query: &str, result: &SearchResult) -> String {
        let mut output = self.format_posts(&format!("Results for \"{query}\""), &result.posts);
        if result.has_more {
            let next = result
                .next_offset
                .map(|offset| format!(" (next offset {offset})"))
                .unwrap_or_default();
            output.push_str(&format!("  ...more results available{next}\n"));
        }
        output
    }

    pub fn format_post(&self, post: &PostMetadata) -> String {
        let mut output = self.heading(&post.title);
        if let Some(subtitle) = &post.subtitle {
            output.push_str(&format!("  {subtitle}\n"));
        }
        output.push_str(&self.field("Slug", &post.slug));
        output.push_str(&self.field("Published", &post.post_date));
        output.push_str(&self.field("Audience", &post.audience));
        output.push_str(&self.field("Paywalled", &post.is_paywalled.to_string()));
        if let Some(author) = &post.author {
            output.push_str(&self.field("Author", &format!("{} (@{})", author.name, author.handle)));
        }
        if let Some(words) = post.word_count {
            output.push_str(&self.field("Words", &words.to_string()));
        }
        if let Some(minutes) = post.reading_time_minutes {
            output.push_str(&self.field("Reading time", &format!("{minutes} min")));
        }
        if let Some(reactions) = &post.reactions {
            output.push_str(&self.field("Reactions", &reactions.total().to_string()));
        }
        if let Some(stats) = &post.stats {
            output.push_str(&self.field("Comments", &stats.comments.to_string()));
        }
        if let Some(url) = &post.canonical_url {
            output.push_str(&format!(
                "  {}: {}\n",
                self.colorize("URL", &Color::Yellow, false),
                self.colorize(url, &Color::Blue, false)
            ));
        }
        output
    }

    pub fn format_full_post(&self, post: &FullPost) -> String {
        let mut output = self.format_post(&post.metadata);
        output.push('\n');
        output.push_str(&post.content);
        output.push('\n');
        output
    }

    pub fn format_newsletter(&self, metadata: &NewsletterMetadata) -> String {
        let mut output = self.heading(&metadata.name);
        if let Some(description) = &metadata.description {
            output.push_str(&format!("  {description}\n"));
        }
        output.push_str(&self.field("Subdomain", &metadata.subdomain));
        if let Some(domain) = &metadata.custom_domain {
            output.push_str(&self.field("Custom domain", domain));
        }
        output.push_str(&self.field(
            "Author",
            &format!("{} (@{})", metadata.author_name, metadata.author_handle),
        ));
        if let Some(language) = &metadata.language {
            output.push_str(&self.field("Language", language));
        }
        if let Some(founded) = &metadata.founded_at {
            output.push_str(&self.field("Founded", founded));
        }
        output
    }

    pub fn format_podcasts(&self, episodes: &[PodcastEpisode]) -> String {
        let mut output = self.heading(&format!("Podcast episodes ({})", episodes.len()));
        for episode in episodes {
            let duration = episode
                .duration
                .map(|secs| format!(" [{}:{:02}]", secs / 60, secs % 60))
                .unwrap_or_default();
            output.push_str(&format!(
                "  {} {}{}\n",
                self.colorize(&episode.publish_date, &Color::Yellow, false),
                episode.title,
                duration
            ));
            output.push_str(&format!(
                "    {}\n",
                self.colorize(&episode.audio_url, &Color::Blue, false)
            ));
        }
        output
    }

    pub fn format_recommendations(&self, recommendations: &[Recommendation]) -> String {
        let mut output = self.heading(&format!("Recommendations ({})", recommendations.len()));
        for recommendation in recommendations {
            output.push_str(&format!(
                "  {} {} by {}\n",
                self.colorize(&recommendation.publication_subdomain, &Color::Cyan, false),
                recommendation.publication_name,
                recommendation.author_name
            ));
        }
        output
    }

    pub fn format_authors(&self, authors: &[Author]) -> String {
        let mut output = self.heading(&format!("Authors ({})", authors.len()));
        for author in authors {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize(&format!("@{}", author.handle), &Color::Cyan, false),
                author.name
            ));
        }
        output
    }

    pub fn format_profile(&self, profile: &UserProfile, original: Option<&str>) -> String {
        let mut output = self.heading(&format!("{} (@{})", profile.name, profile.handle));
        if let Some(original) = original {
            output.push_str(&self.field("Renamed from", &format!("@{original}")));
        }
        if let Some(bio) = &profile.bio {
            output.push_str(&format!("  {bio}\n"));
        }
        output.push_str(&self.field("Writer", &profile.is_writer.to_string()));
        for (label, value) in [
            ("Location", &profile.location),
            ("Website", &profile.website),
            ("Twitter", &profile.twitter_screen_name),
        ] {
            if let Some(value) = value {
                output.push_str(&self.field(label, value));
            }
        }
        for (label, count) in [
            ("Subscriptions", profile.subscription_count),
            ("Following", profile.following_count),
            ("Followers", profile.follower_count),
        ] {
            if let Some(count) = count {
                output.push_str(&self.field(label, &count.to_string()));
            }
        }
        output
    }

    pub fn format_subscriptions(&self, handle: &str, subscriptions: &[Subscription]) -> String {
        let mut output = self.heading(&format!(
            "Subscriptions of @{handle} ({})",
            subscriptions.len()
        ));
        for subscription in subscriptions {
            output.push_str(&format!(
                "  {} {} [{:?}]\n",
                self.colorize(&subscription.publication_subdomain, &Color::Cyan, false),
                subscription.publication_name,
                subscription.subscription_type
            ));
        }
        output
    }

    pub fn format_resolved(&self, handle: &str, resolved: Option<&str>) -> String {
        match resolved {
            Some(new_handle) => format!(
                "@{} {} @{}\n",
                handle,
                self.colorize("->", &Color::Green, true),
                self.colorize(new_handle, &Color::Cyan, false)
            ),
            None => format!("@{handle} has no redirect\n"),
        }
    }

    fn post_line(&self, post: &PostMetadata) -> String {
        let lock = if post.is_paywalled { " [paid]" } else { "" };
        format!(
            "  {} {}{}\n    {}\n",
            self.colorize(date_part(&post.post_date), &Color::Yellow, false),
            post.title,
            lock,
            self.colorize(&post.slug, &Color::Cyan, false)
        )
    }

    fn heading(&self, text: &str) -> String {
        format!("{}\n", self.colorize(text, &Color::Green, true))
    }

    fn field(&self, label: &str, value: &str) -> String {
        format!(
            "  {}: {}\n",
            self.colorize(label, &Color::Yellow, false),
            self.colorize(value, &Color::Cyan, false)
        )
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        if !self.colored {
            return text.to_string();
        }
        let colored_text = match color {
            Color::Green => text.green(),
            Color::Yellow => text.yellow(),
            Color::Blue => text.blue(),
            Color::Cyan => text.cyan(),
        };
        if bold {
            colored_text.bold().to_string()
        } else {
            colored_text.to_string()
        }
    }
}

/// `2024-05-01T10:00:00.000Z` -> `2024-05-01`
fn date_part(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}
