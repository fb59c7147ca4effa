// ABOUTME: Collaborator contracts consulted during extraction: CAPTCHA detection and subscription lookup.
// ABOUTME: Ships markup-based default implementations that inspect the already-fetched document.

use std::fmt;

use async_trait::async_trait;
use scraper::Html;
use tracing::warn;

use crate::dom::select_first;
use crate::error::Result;

/// Outcome of a CAPTCHA check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptchaVerdict {
    Clear,
    Challenge,
}

/// Inspects a fetched document for a bot challenge.
///
/// The check is advisory: resolvers invoke it before their structural checks
/// and carry on regardless of the verdict.
pub trait CaptchaDetector: fmt::Debug {
    fn check(&self, doc: &Html, cookies: Option<&str>) -> CaptchaVerdict;
}

/// Reports whether a title is part of a subscription program.
#[async_trait(?Send)]
pub trait SubscriptionCheck: fmt::Debug {
    async fn is_member(&self, doc: &Html) -> Result<bool>;
}

const CAPTCHA_SELECTORS: &[&str] = &[
    "form[action*='validateCaptcha']",
    "#captchacharacters",
    "img[src*='captcha']",
];

/// Detects the retailer's challenge page by its form markup and logs it.
#[derive(Debug, Default, Clone)]
pub struct MarkupCaptchaDetector;

impl CaptchaDetector for MarkupCaptchaDetector {
    fn check(&self, doc: &Html, cookies: Option<&str>) -> CaptchaVerdict {
        match CAPTCHA_SELECTORS
            .iter()
            .find(|css| select_first(doc, css).is_some())
        {
            Some(css) => {
                warn!(
                    selector = css,
                    has_cookies = cookies.is_some(),
                    "challenge page detected"
                );
                CaptchaVerdict::Challenge
            }
            None => CaptchaVerdict::Clear,
        }
    }
}

const KINDLE_UNLIMITED_SELECTORS: &[&str] = &[
    "i.a-icon-kindle-unlimited",
    "#tmm-ku-upsell",
    "#kindle-unlimited-logo",
    "[data-action='ku-upsell']",
];

/// Looks for the Kindle Unlimited badge on the product page.
#[derive(Debug, Default, Clone)]
pub struct MarkupSubscriptionCheck;

#[async_trait(?Send)]
impl SubscriptionCheck for MarkupSubscriptionCheck {
    async fn is_member(&self, doc: &Html) -> Result<bool> {
        Ok(KINDLE_UNLIMITED_SELECTORS
            .iter()
            .any(|css| select_first(doc, css).is_some()))
    }
}
