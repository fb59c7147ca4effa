// ABOUTME: The main Client struct tying URL resolution, fetching, and retailer extraction together.
// ABOUTME: Provides async parse()/parse_as() for URLs and extract() for already-fetched HTML.

use std::sync::Arc;

use scraper::Html;
use tracing::{debug, warn};

use crate::collaborators::{MarkupCaptchaDetector, MarkupSubscriptionCheck};
use crate::error::{ResolveError, Result};
use crate::fetch::{Fetcher, HttpFetcher, RequestContext};
use crate::localization::builtin_table;
use crate::message::Message;
use crate::options::{ClientBuilder, Options};
use crate::resolver::{Resolver, ResolverDeps, Retailer, RetailerResolver};

/// Resolves retailer URLs into normalized book metadata.
#[derive(Debug)]
pub struct Client {
    opts: Options,
    fetcher: Arc<dyn Fetcher>,
    deps: ResolverDeps,
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    pub fn new(opts: Options) -> Self {
        let fetcher = opts.fetcher.clone().unwrap_or_else(|| {
            let http_client = opts.http_client.clone().unwrap_or_else(|| {
                reqwest::Client::builder()
                    .user_agent(&opts.user_agent)
                    .timeout(opts.timeout)
                    .gzip(true)
                    .brotli(true)
                    .deflate(true)
                    .build()
                    .unwrap_or_else(|e| {
                        warn!(error = %e, "falling back to default HTTP client");
                        reqwest::Client::new()
                    })
            });
            Arc::new(HttpFetcher::new(http_client, opts.headers.clone()))
        });

        let deps = ResolverDeps {
            localization: opts
                .localization
                .clone()
                .unwrap_or_else(|| Arc::new(builtin_table().clone())),
            captcha: opts
                .captcha
                .clone()
                .unwrap_or_else(|| Arc::new(MarkupCaptchaDetector)),
            subscriptions: opts
                .subscriptions
                .clone()
                .unwrap_or_else(|| Arc::new(MarkupSubscriptionCheck)),
        };

        Self {
            opts,
            fetcher,
            deps,
        }
    }

    /// Build the resolver for a retailer.
    pub fn resolver(&self, retailer: Retailer) -> RetailerResolver {
        RetailerResolver::new(retailer, &self.deps)
    }

    fn request_context(&self) -> RequestContext {
        RequestContext {
            cookies: self.opts.cookies.clone(),
        }
    }

    /// Fetch the page for a URL, picking the retailer from its host.
    pub async fn resolve(&self, url: &str) -> Result<String> {
        let retailer = Retailer::from_url(url)?;
        self.resolve_as(retailer, url).await
    }

    /// Fetch the page for a URL using an explicitly chosen retailer.
    pub async fn resolve_as(&self, retailer: Retailer, url: &str) -> Result<String> {
        if url.is_empty() {
            return Err(ResolveError::invalid_url("Resolve", url, None));
        }
        debug!(%retailer, url, "resolving");
        self.resolver(retailer)
            .resolve(self.fetcher.as_ref(), url, &self.request_context())
            .await
    }

    /// Extract metadata from an already-fetched page body.
    pub async fn extract(&self, retailer: Retailer, html: &str) -> Result<Message> {
        if html.trim().is_empty() {
            return Err(ResolveError::missing_structure(
                "Extract",
                retailer.to_string(),
                Some(anyhow::anyhow!("empty HTML")),
            ));
        }
        let doc = Html::parse_document(html);
        self.resolver(retailer)
            .extract_message(&doc, &self.request_context())
            .await
    }

    /// Fetch a URL and extract its metadata, picking the retailer from its host.
    pub async fn parse(&self, url: &str) -> Result<Message> {
        let retailer = Retailer::from_url(url)?;
        self.parse_as(retailer, url).await
    }

    /// Fetch a URL and extract its metadata using an explicitly chosen retailer.
    pub async fn parse_as(&self, retailer: Retailer, url: &str) -> Result<Message> {
        let body = self.resolve_as(retailer, url).await?;
        self.extract(retailer, &body).await
    }
}
