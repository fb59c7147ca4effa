// ABOUTME: Configuration options for the bookmeta client and the fluent ClientBuilder.
// ABOUTME: Collaborators (fetcher, CAPTCHA detector, subscription check, localization) are swappable here.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::client::Client;
use crate::collaborators::{CaptchaDetector, SubscriptionCheck};
use crate::fetch::Fetcher;
use crate::localization::LocalizationTable;

/// Configuration options for the client.
#[derive(Debug, Clone)]
pub struct Options {
    pub timeout: Duration,
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    /// Cookie header sent with every request and shown to the CAPTCHA detector.
    pub cookies: Option<String>,
    pub http_client: Option<reqwest::Client>,
    pub fetcher: Option<Arc<dyn Fetcher>>,
    pub localization: Option<Arc<LocalizationTable>>,
    pub captcha: Option<Arc<dyn CaptchaDetector>>,
    pub subscriptions: Option<Arc<dyn SubscriptionCheck>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: "bookmeta/0.1".to_string(),
            headers: HashMap::new(),
            cookies: None,
            http_client: None,
            fetcher: None,
            localization: None,
            captcha: None,
            subscriptions: None,
        }
    }
}

/// Builder for constructing Client instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Set the cookie header for all requests.
    pub fn cookies(mut self, cookies: impl Into<String>) -> Self {
        self.opts.cookies = Some(cookies.into());
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Replace the HTTP fetcher entirely.
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.opts.fetcher = Some(fetcher);
        self
    }

    /// Use a custom localization table instead of the builtin one.
    pub fn localization(mut self, table: LocalizationTable) -> Self {
        self.opts.localization = Some(Arc::new(table));
        self
    }

    /// Use a custom CAPTCHA detector.
    pub fn captcha_detector(mut self, detector: Arc<dyn CaptchaDetector>) -> Self {
        self.opts.captcha = Some(detector);
        self
    }

    /// Use a custom subscription check.
    pub fn subscription_check(mut self, check: Arc<dyn SubscriptionCheck>) -> Self {
        self.opts.subscriptions = Some(check);
        self
    }

    /// Build the Client with the configured options.
    pub fn build(self) -> Client {
        Client::new(self.opts)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
