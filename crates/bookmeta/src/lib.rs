// ABOUTME: Main library entry point for bookmeta, the retailer book metadata extractor.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, Message, resolvers, collaborators, and errors.

//! bookmeta - normalized book metadata from retailer product pages.
//!
//! Each supported retailer has a resolver that rewrites its URLs before
//! fetching and extracts a [`Message`] (title, author, publisher, tags) from
//! the fetched page. Localized detail labels are mapped to canonical keys via
//! a [`LocalizationTable`].
//!
//! # Example
//!
//! ```no_run
//! use bookmeta::{Client, ResolveError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ResolveError> {
//!     let client = Client::builder().build();
//!     let message = client.parse("https://www.audible.com/pd/B002V1OF70").await?;
//!     println!("{} by {}", message.title(), message.author());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod collaborators;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod localization;
pub mod message;
pub mod options;
pub mod resolver;

pub use crate::client::Client;
pub use crate::collaborators::{
    CaptchaDetector, CaptchaVerdict, MarkupCaptchaDetector, MarkupSubscriptionCheck,
    SubscriptionCheck,
};
pub use crate::error::{ErrorCode, ResolveError, Result};
pub use crate::fetch::{Fetcher, HttpFetcher, RequestContext};
pub use crate::localization::{builtin_table, LocalizationTable, LANGUAGE_KEY, PUBLISHER_KEY};
pub use crate::message::{Message, AUDIOBOOK_TAG, KINDLE_UNLIMITED_TAG};
pub use crate::options::{ClientBuilder, Options};
pub use crate::resolver::{
    AmazonResolver, AudibleResolver, Resolver, ResolverDeps, Retailer, RetailerResolver,
};
