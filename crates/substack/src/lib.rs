//! Typed access to the Substack API.
//!
//! ```rust,no_run
//! # async fn demo() -> substack_api::Result<()> {
//! use std::sync::Arc;
//! use substack_api::{Newsletter, Post, RequestOptions, SubstackAuth, User};
//!
//! let newsletter = Newsletter::new("https://example.substack.com", None)?;
//! let posts = newsletter.get_posts(&RequestOptions::default().limit(5)).await?;
//!
//! let auth = Arc::new(SubstackAuth::from_file("cookies.json")?);
//! let post = Post::new("https://example.substack.com/p/hello", Some(auth))?;
//! let html = post.get_content().await?;
//!
//! let user = User::new("someone", None)?;
//! let name = user.name().await?;
//! # let _ = (posts, html, name);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod newsletter;
pub mod post;
pub mod types;
pub mod user;
mod utils;

pub use auth::{Cookie, SameSite, SubstackAuth};
pub use client::{ApiClient, ClientConfig};
pub use error::{ErrorKind, Result, SubstackError};
pub use newsletter::Newsletter;
pub use post::Post;
pub use types::*;
pub use user::{User, resolve_handle_redirect, resolve_handle_redirect_with};
