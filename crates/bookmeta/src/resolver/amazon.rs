// ABOUTME: Markup-driven resolver for Amazon Kindle product pages.
// ABOUTME: Reads title/author via selector fallbacks and publisher/language from the localized details list.

//! Amazon Kindle resolver.
//!
//! Pipeline:
//! 1. Run the CAPTCHA detector (advisory).
//! 2. Refuse anything whose format subtitle does not mention Kindle.
//! 3. Locate the locale indicator, title, author and details list, then
//!    validate them in one go.
//! 4. Scan the details list until both language and publisher are known.
//! 5. Ask the subscription check for Kindle Unlimited; failures are logged only.
//!
//! A detail item looks like:
//!
//! ```html
//! <li>
//!   <span class="a-list-item">
//!     <span class="a-text-bold">Publisher &rlm; : &lrm;</span>
//!     <span>Penguin (16 Sept. 2021)</span>
//!   </span>
//! </li>
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use tracing::{debug, warn};

use crate::collaborators::{CaptchaDetector, CaptchaVerdict, SubscriptionCheck};
use crate::dom::{
    descendants_named, raw_text, sanitize_label, select_all_in, select_first, select_first_in,
    text_content, Entry,
};
use crate::error::{ResolveError, Result};
use crate::fetch::RequestContext;
use crate::localization::{LocalizationTable, LANGUAGE_KEY, PUBLISHER_KEY};
use crate::message::{Message, KINDLE_UNLIMITED_TAG};
use crate::resolver::{
    check_required_elements, ensure_complete, is_language_tag_required, Resolver,
};

const SITE_LANGUAGE_SELECTOR: &str = ".nav-logo-locale";
const TITLE_SELECTOR: &str = "#productTitle";
const AUTHOR_SELECTOR: &str = ".contributorNameID";
const AUTHOR_WRAPPER_SELECTOR: &str = ".author";
const LINK_SELECTOR: &str = ".a-link-normal";
const FORMAT_SELECTOR: &str = "#productSubtitle";
const DETAILS_SELECTOR: &str = ".detail-bullet-list";
const DETAIL_ITEM_SELECTOR: &str = "li";
const DETAIL_SPAN_SELECTOR: &str = ".a-list-item";

const KINDLE_MARKER: &str = "kindle";

const OP: &str = "Amazon.ExtractMessage";

#[derive(Debug)]
pub struct AmazonResolver {
    localization: Arc<LocalizationTable>,
    captcha: Arc<dyn CaptchaDetector>,
    subscriptions: Arc<dyn SubscriptionCheck>,
}

impl AmazonResolver {
    pub fn new(
        localization: Arc<LocalizationTable>,
        captcha: Arc<dyn CaptchaDetector>,
        subscriptions: Arc<dyn SubscriptionCheck>,
    ) -> Self {
        Self {
            localization,
            captcha,
            subscriptions,
        }
    }

    /// Primary author selector, then a link inside the older author wrapper.
    fn author_element<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        select_first(doc, AUTHOR_SELECTOR).or_else(|| {
            select_first(doc, AUTHOR_WRAPPER_SELECTOR)
                .and_then(|wrapper| select_first_in(wrapper, LINK_SELECTOR))
        })
    }

    fn set_details(
        &self,
        message: &mut Message,
        site_language: &str,
        details: ElementRef<'_>,
    ) -> Result<()> {
        let mut language = false;
        let mut publisher = false;

        for item in select_all_in(details, DETAIL_ITEM_SELECTOR) {
            if language && publisher {
                break;
            }

            let (label, value) = detail_entry(item)?.into_parts();
            match self.localization.lookup(site_language, &label) {
                Some(LANGUAGE_KEY) => {
                    language = true;
                    self.add_language_tag(message, site_language, &value);
                }
                Some(PUBLISHER_KEY) => {
                    publisher = true;
                    message.set_publisher(value);
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn add_language_tag(&self, message: &mut Message, site_language: &str, language: &str) {
        match self.localization.lookup(site_language, language) {
            None => {
                debug!(site_language, language, "language not in localization table");
                message.add_tag(language.to_lowercase());
            }
            Some(code) if is_language_tag_required(&self.localization, Some(code)) => {
                message.add_tag(code);
            }
            Some(_) => {}
        }
    }

    async fn add_kindle_unlimited_tag(&self, message: &mut Message, doc: &Html) {
        match self.subscriptions.is_member(doc).await {
            Ok(true) => message.add_tag(KINDLE_UNLIMITED_TAG),
            Ok(false) => {}
            Err(err) => {
                warn!(error = %err, title = message.title(), "kindle unlimited lookup failed");
            }
        }
    }
}

/// Fails with `UnsupportedFormat` unless the subtitle names the Kindle format.
fn check_kindle_format(format: Option<ElementRef<'_>>) -> Result<()> {
    let is_kindle = format
        .map(|el| text_content(el).to_lowercase().contains(KINDLE_MARKER))
        .unwrap_or(false);

    if is_kindle {
        Ok(())
    } else {
        Err(ResolveError::unsupported_format(
            OP,
            FORMAT_SELECTOR,
            Some(anyhow::anyhow!("the product is not a kindle book")),
        ))
    }
}

/// Reads the label/value pair of one details list item.
fn detail_entry(item: ElementRef<'_>) -> Result<Entry<String, String>> {
    let parent = select_first_in(item, DETAIL_SPAN_SELECTOR).ok_or_else(|| {
        ResolveError::malformed_detail(
            OP,
            DETAIL_SPAN_SELECTOR,
            Some(anyhow::anyhow!(
                "cannot read a product detail: {}",
                text_content(item)
            )),
        )
    })?;

    match descendants_named(parent, "span").as_slice() {
        [label, value] => Ok(Entry::new(sanitize_label(*label), text_content(*value))),
        spans => Err(ResolveError::malformed_detail(
            OP,
            DETAIL_SPAN_SELECTOR,
            Some(anyhow::anyhow!(
                "expected 2 spans in product detail, found {}",
                spans.len()
            )),
        )),
    }
}

#[async_trait(?Send)]
impl Resolver for AmazonResolver {
    async fn extract_message(&self, doc: &Html, ctx: &RequestContext) -> Result<Message> {
        if self.captcha.check(doc, ctx.cookies.as_deref()) == CaptchaVerdict::Challenge {
            debug!("continuing extraction on a challenge page");
        }

        check_kindle_format(select_first(doc, FORMAT_SELECTOR))?;

        let site_language = select_first(doc, SITE_LANGUAGE_SELECTOR);
        let title = select_first(doc, TITLE_SELECTOR);
        let author = self.author_element(doc);
        let details = select_first(doc, DETAILS_SELECTOR);

        let [site_language, title, author, details] = check_required_elements(
            OP,
            [
                (SITE_LANGUAGE_SELECTOR, site_language),
                (TITLE_SELECTOR, title),
                (AUTHOR_SELECTOR, author),
                (DETAILS_SELECTOR, details),
            ],
        )?;

        let mut message = Message::new();
        message.set_title(text_content(title));
        message.set_author(text_content(author));
        self.set_details(&mut message, &raw_text(site_language), details)?;
        ensure_complete(OP, &message)?;

        self.add_kindle_unlimited_tag(&mut message, doc).await;

        Ok(message)
    }
}
