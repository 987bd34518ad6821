use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use substack_api::PostSorting;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file
    #[arg(long, global = true, env = "SUBSTACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON cookie export used for paywalled content
    #[arg(long, global = true, env = "SUBSTACK_COOKIES")]
    pub cookies: Option<PathBuf>,

    /// Cookie header string, e.g. "substack.sid=...; substack.lli=..."
    #[arg(
        long,
        global = true,
        env = "SUBSTACK_COOKIE_STRING",
        hide_env_values = true,
        conflicts_with = "cookies"
    )]
    pub cookie_string: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Query a publication
    Newsletter {
        /// Publication URL, e.g. https://example.substack.com
        url: String,

        #[command(subcommand)]
        action: Option<NewsletterAction>,

        #[command(flatten)]
        paging: Paging,
    },

    /// Fetch a single post
    Post {
        /// Post URL, e.g. https://example.substack.com/p/some-post
        url: String,

        /// Print the post body
        #[arg(long)]
        content: bool,

        /// Print metadata and body together
        #[arg(long, conflicts_with = "content")]
        full: bool,
    },

    /// Look up a user profile
    User {
        handle: String,

        /// Print the raw profile document
        #[arg(long)]
        raw: bool,

        /// List the user's subscriptions
        #[arg(long, conflicts_with = "raw")]
        subscriptions: bool,

        /// Do not follow handle redirects
        #[arg(long)]
        no_redirects: bool,
    },

    /// Find the current handle for a renamed user
    Resolve { handle: String },

    /// Show configuration
    Config {
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum NewsletterAction {
    /// Recent posts (default)
    Posts,
    /// Search posts
    Search { query: String },
    Podcasts,
    Recommendations,
    Authors,
    /// Publication metadata
    Metadata,
}

#[derive(clap::Args, Debug, Clone, Copy)]
pub struct Paging {
    #[arg(long, global = true, default_value_t = 12)]
    pub limit: u32,

    #[arg(long, global = true, default_value_t = 0)]
    pub offset: u32,

    #[arg(long, global = true, value_enum, default_value_t = SortArg::New)]
    pub sort: SortArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    New,
    Top,
    Hot,
}

impl From<SortArg> for PostSorting {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::New => PostSorting::New,
            SortArg::Top => PostSorting::Top,
            SortArg::Hot => PostSorting::Hot,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Args::try_parse_from(["substack", "--timeout", "0", "resolve", "old"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let args = Args::try_parse_from(["substack", "--timeout", "5", "resolve", "old"]).unwrap();
        assert_eq!(args.timeout, Some(5));
    }

    #[test]
    fn test_cookie_sources_conflict() {
        let err = Args::try_parse_from([
            "substack",
            "--cookies",
            "cookies.json",
            "--cookie-string",
            "substack.sid=abc",
            "resolve",
            "old",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_newsletter_paging_after_action() {
        let args = Args::try_parse_from([
            "substack",
            "newsletter",
            "https://example.substack.com",
            "search",
            "rust",
            "--limit",
            "3",
            "--sort",
            "top",
        ])
        .unwrap();

        let Commands::Newsletter { action, paging, .. } = args.command else {
            panic!("expected newsletter command");
        };
        assert!(matches!(action, Some(NewsletterAction::Search { query }) if query == "rust"));
        assert_eq!(paging.limit, 3);
        assert_eq!(PostSorting::from(paging.sort), PostSorting::Top);
    }
}
