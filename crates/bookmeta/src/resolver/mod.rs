// ABOUTME: Resolver contract shared by every retailer plus the closed set of retailer variants.
// ABOUTME: Holds the common structure check, language-tag policy, and URL-to-retailer matching.

//! Retailer resolvers.
//!
//! A resolver turns a retailer URL into a fetchable one (`rewrite_url`,
//! `resolve`) and a fetched document into a [`Message`] (`extract_message`).
//! The supported retailers form a closed set: [`Retailer`] names them and
//! [`RetailerResolver`] holds one configured resolver per variant.

pub mod amazon;
pub mod audible;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html};

use crate::collaborators::{CaptchaDetector, SubscriptionCheck};
use crate::error::{ResolveError, Result};
use crate::fetch::{Fetcher, RequestContext};
use crate::localization::LocalizationTable;
use crate::message::Message;

pub use amazon::AmazonResolver;
pub use audible::AudibleResolver;

/// Capability shared by all retailer resolvers.
#[async_trait(?Send)]
pub trait Resolver {
    /// Rewrites `url` before it is fetched. Must be idempotent.
    fn rewrite_url(&self, url: &str) -> Result<String> {
        Ok(url.to_string())
    }

    /// Fetches the raw page for `url` after rewriting it.
    async fn resolve(
        &self,
        fetcher: &dyn Fetcher,
        url: &str,
        ctx: &RequestContext,
    ) -> Result<String> {
        let url = self.rewrite_url(url)?;
        fetcher.fetch(&url, ctx).await
    }

    /// Extracts the normalized metadata from a fetched document.
    async fn extract_message(&self, doc: &Html, ctx: &RequestContext) -> Result<Message>;
}

/// Returns every required element, or fails with `MissingStructure` naming each absent one.
///
/// Call once after all required lookups so a changed layout is reported as a
/// single failure.
pub fn check_required_elements<'a, const N: usize>(
    op: &str,
    elements: [(&str, Option<ElementRef<'a>>); N],
) -> Result<[ElementRef<'a>; N]> {
    let found: Vec<ElementRef<'a>> = elements.iter().filter_map(|(_, el)| *el).collect();

    found.try_into().map_err(|_| {
        let missing: Vec<&str> = elements
            .iter()
            .filter(|(_, el)| el.is_none())
            .map(|(css, _)| *css)
            .collect();
        ResolveError::missing_structure(op, missing.join(", "), None)
    })
}

/// True when `language` is known and not one of the table's default languages.
pub fn is_language_tag_required(table: &LocalizationTable, language: Option<&str>) -> bool {
    match language {
        Some(lang) if !lang.trim().is_empty() => !table.is_default_language(lang),
        _ => false,
    }
}

/// Fails with `MissingStructure` unless title and author are both present.
pub fn ensure_complete(op: &str, message: &Message) -> Result<()> {
    if message.title().is_empty() {
        return Err(ResolveError::missing_structure(op, "title", None));
    }
    if message.author().is_empty() {
        return Err(ResolveError::missing_structure(op, "author", None));
    }
    Ok(())
}

/// The supported retailers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Retailer {
    Amazon,
    Audible,
}

impl fmt::Display for Retailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Retailer::Amazon => "amazon",
            Retailer::Audible => "audible",
        };
        write!(f, "{}", s)
    }
}

impl Retailer {
    /// Picks the retailer whose storefront hosts `url`.
    ///
    /// Matches `amazon.<tld>` and `audible.<tld>` with any subdomain.
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed = url::Url::parse(url).map_err(|e| {
            ResolveError::invalid_url("SelectRetailer", url, Some(anyhow::anyhow!("{}", e)))
        })?;
        let host = parsed
            .host_str()
            .map(|h| h.to_lowercase())
            .ok_or_else(|| ResolveError::unknown_retailer("SelectRetailer", url))?;

        let labels: Vec<&str> = host.split('.').collect();
        // The brand label is followed by at least one TLD label.
        let brand = labels
            .iter()
            .copied()
            .take(labels.len().saturating_sub(1))
            .find(|l| *l == "amazon" || *l == "audible");

        match brand {
            Some("amazon") => Ok(Retailer::Amazon),
            Some("audible") => Ok(Retailer::Audible),
            _ => Err(ResolveError::unknown_retailer("SelectRetailer", url)),
        }
    }
}

/// Collaborators handed to every resolver built by [`RetailerResolver::new`].
#[derive(Debug, Clone)]
pub struct ResolverDeps {
    pub localization: Arc<LocalizationTable>,
    pub captcha: Arc<dyn CaptchaDetector>,
    pub subscriptions: Arc<dyn SubscriptionCheck>,
}

/// A configured resolver for one retailer.
#[derive(Debug)]
pub enum RetailerResolver {
    Amazon(AmazonResolver),
    Audible(AudibleResolver),
}

impl RetailerResolver {
    pub fn new(retailer: Retailer, deps: &ResolverDeps) -> Self {
        match retailer {
            Retailer::Amazon => RetailerResolver::Amazon(AmazonResolver::new(
                Arc::clone(&deps.localization),
                Arc::clone(&deps.captcha),
                Arc::clone(&deps.subscriptions),
            )),
            Retailer::Audible => {
                RetailerResolver::Audible(AudibleResolver::new(Arc::clone(&deps.localization)))
            }
        }
    }

    pub fn retailer(&self) -> Retailer {
        match self {
            RetailerResolver::Amazon(_) => Retailer::Amazon,
            RetailerResolver::Audible(_) => Retailer::Audible,
        }
    }

    fn inner(&self) -> &dyn Resolver {
        match self {
            RetailerResolver::Amazon(r) => r,
            RetailerResolver::Audible(r) => r,
        }
    }
}

#[async_trait(?Send)]
impl Resolver for RetailerResolver {
    fn rewrite_url(&self, url: &str) -> Result<String> {
        self.inner().rewrite_url(url)
    }

    async fn resolve(
        &self,
        fetcher: &dyn Fetcher,
        url: &str,
        ctx: &RequestContext,
    ) -> Result<String> {
        self.inner().resolve(fetcher, url, ctx).await
    }

    async fn extract_message(&self, doc: &Html, ctx: &RequestContext) -> Result<Message> {
        self.inner().extract_message(doc, ctx).await
    }
}
