//! Records returned by the Substack API.
//!
//! The platform omits many fields depending on the publication and on who is
//! asking, so everything that is not an identifier tolerates absence.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SubstackError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostMetadata {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub post_date: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub email_sent_at: Option<String>,
    #[serde(default, rename = "type")]
    pub post_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub word_count: Option<u64>,
    #[serde(default)]
    pub reading_time_minutes: Option<u64>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub is_paywalled: bool,
    #[serde(default)]
    pub free_unlock: Option<bool>,
    #[serde(default)]
    pub default_comment_sort: Option<String>,
    #[serde(default)]
    pub publication_id: i64,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub reactions: Option<PostReactions>,
    #[serde(default)]
    pub stats: Option<PostStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub twitter_screen_name: Option<String>,
    #[serde(default)]
    pub is_writer: bool,
}

/// Reaction counts keyed by reaction name (`heart`, `laugh`, `like`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostReactions(pub BTreeMap<String, u64>);

impl PostReactions {
    pub fn get(&self, reaction: &str) -> u64 {
        self.0.get(reaction).copied().unwrap_or(0)
    }

    pub fn heart(&self) -> u64 {
        self.get("heart")
    }

    pub fn laugh(&self) -> u64 {
        self.get("laugh")
    }

    pub fn like(&self) -> u64 {
        self.get("like")
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStats {
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub email_opens: Option<u64>,
    #[serde(default)]
    pub email_clicks: Option<u64>,
    #[serde(default)]
    pub web_hits: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsletterMetadata {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subdomain: String,
    #[serde(default)]
    pub custom_domain: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_handle: String,
    #[serde(default)]
    pub author_id: i64,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub hero_image: Option<String>,
    #[serde(default)]
    pub hero_text: Option<String>,
    #[serde(default)]
    pub twitter_screen_name: Option<String>,
    #[serde(default)]
    pub facebook_page_url: Option<String>,
    #[serde(default)]
    pub founded_at: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub explicit: Option<bool>,
    #[serde(default, rename = "type")]
    pub publication_type: String,
    #[serde(default)]
    pub stripe_country_code: Option<String>,
    #[serde(default)]
    pub cover_photo_url: Option<String>,
    #[serde(default)]
    pub theme: Option<NewsletterTheme>,
    #[serde(default)]
    pub paid_subscription_benefits: Option<Vec<String>>,
    #[serde(default)]
    pub free_subscription_count: Option<u64>,
    #[serde(default)]
    pub paid_subscription_count: Option<u64>,
    #[serde(default)]
    pub founding_subscription_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsletterTheme {
    pub background_pop: String,
    pub background_pop_rgb: String,
    pub background_contrast_pop: String,
    pub background_contrast_pop_rgb: String,
    pub primary_text: String,
    pub primary_text_rgb: String,
    pub secondary_text: String,
    pub secondary_text_rgb: String,
    pub tertiary_text: String,
    pub tertiary_text_rgb: String,
    pub tertiary_text_rgb_faded: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub twitter_screen_name: Option<String>,
    #[serde(default)]
    pub is_writer: bool,
    #[serde(default)]
    pub is_subscriber: bool,
    #[serde(default)]
    pub subscription_count: Option<u64>,
    #[serde(default)]
    pub following_count: Option<u64>,
    #[serde(default)]
    pub follower_count: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    #[default]
    Free,
    Paid,
    Founding,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Cancelled,
    PastDue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    #[serde(default)]
    pub publication_id: i64,
    #[serde(default)]
    pub publication_name: String,
    #[serde(default)]
    pub publication_subdomain: String,
    #[serde(default)]
    pub publication_logo_url: Option<String>,
    #[serde(default)]
    pub subscription_type: SubscriptionType,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub status: SubscriptionStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodcastEpisode {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub audio_url: String,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub episode_number: Option<u32>,
    #[serde(default)]
    pub season_number: Option<u32>,
    #[serde(default)]
    pub publish_date: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: i64,
    #[serde(default)]
    pub publication_id: i64,
    #[serde(default)]
    pub publication_name: String,
    #[serde(default)]
    pub publication_subdomain: String,
    #[serde(default)]
    pub publication_description: Option<String>,
    #[serde(default)]
    pub publication_logo_url: Option<String>,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub recommendation_text: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub posts: Vec<PostMetadata>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_offset: Option<u64>,
}

/// A post's metadata together with its rendered HTML body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullPost {
    pub metadata: PostMetadata,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSorting {
    #[default]
    New,
    Top,
    Hot,
}

impl PostSorting {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostSorting::New => "new",
            PostSorting::Top => "top",
            PostSorting::Hot => "hot",
        }
    }
}

impl fmt::Display for PostSorting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostSorting {
    type Err = SubstackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "new" => Ok(PostSorting::New),
            "top" => Ok(PostSorting::Top),
            "hot" => Ok(PostSorting::Hot),
            other => Err(SubstackError::api(format!("Unknown post sorting: {other}"))),
        }
    }
}

pub const DEFAULT_PAGE_LIMIT: u32 = 12;

/// Paging and ordering for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    pub limit: u32,
    pub offset: u32,
    pub sorting: PostSorting,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
            sorting: PostSorting::New,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn sorting(mut self, sorting: PostSorting) -> Self {
        self.sorting = sorting;
        self
    }
}
