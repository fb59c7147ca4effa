// ABOUTME: Structured-data resolver for Audible audiobook pages.
// ABOUTME: Reads the embedded JSON-LD book record and forces the storefront to skip its locale redirect.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use serde_json::Value;
use tracing::debug;

use crate::dom::{raw_text, select_all_in, select_first};
use crate::error::{ResolveError, Result};
use crate::fetch::RequestContext;
use crate::localization::LocalizationTable;
use crate::message::{Message, AUDIOBOOK_TAG};
use crate::resolver::{
    check_required_elements, ensure_complete, is_language_tag_required, Resolver,
};

const OVERRIDE_LANGUAGE: &str = "ipRedirectOverride";
const BOTTOM_SELECTOR: &str = "#bottom-0";
const SCRIPT_SELECTOR: &str = "script";

const OP: &str = "Audible.ExtractMessage";

#[derive(Debug)]
pub struct AudibleResolver {
    localization: Arc<LocalizationTable>,
}

impl AudibleResolver {
    pub fn new(localization: Arc<LocalizationTable>) -> Self {
        Self { localization }
    }
}

/// Finds the first record exposing a non-null `bookFormat` in the container's scripts.
///
/// Script blocks that are not JSON are skipped; other structured-data objects
/// (breadcrumbs, organization) are passed over.
fn find_book(container: ElementRef<'_>) -> Result<Value> {
    for script in select_all_in(container, SCRIPT_SELECTOR) {
        let text = raw_text(script);
        let records = match serde_json::from_str::<Value>(text.trim()) {
            Ok(Value::Array(items)) => items,
            Ok(obj @ Value::Object(_)) => vec![obj],
            Ok(_) => continue,
            Err(e) => {
                debug!(error = %e, "skipping script block that is not JSON");
                continue;
            }
        };

        let book = records
            .into_iter()
            .find(|record| record.get("bookFormat").is_some_and(|f| !f.is_null()));
        if let Some(record) = book {
            return Ok(record);
        }
    }

    Err(ResolveError::missing_structure(
        OP,
        SCRIPT_SELECTOR,
        Some(anyhow::anyhow!("cannot get audiobook information")),
    ))
}

/// Reads a schema.org text-or-thing value: a plain string, or the `name` of an object.
///
/// Any other shape reads as absent.
fn text_or_name(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj.get("name")?.as_str()?,
        _ => return None,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Reads `field` as a list of names; a single value counts as a list of one.
fn names(record: &Value, field: &str) -> Vec<String> {
    match record.get(field) {
        Some(Value::Array(items)) => items.iter().filter_map(text_or_name).collect(),
        Some(value) => text_or_name(value).into_iter().collect(),
        None => Vec::new(),
    }
}

fn field(record: &Value, name: &str) -> Option<String> {
    record.get(name).and_then(text_or_name)
}

/// Drops every `ipRedirectOverride` segment from a raw query, leaving the others as written.
fn strip_override(query: &str) -> Vec<&str> {
    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| segment.split('=').next() != Some(OVERRIDE_LANGUAGE))
        .collect()
}

#[async_trait(?Send)]
impl Resolver for AudibleResolver {
    /// Replaces any `ipRedirectOverride` query pair with `ipRedirectOverride=true`.
    fn rewrite_url(&self, url: &str) -> Result<String> {
        let mut parsed = url::Url::parse(url).map_err(|e| {
            ResolveError::invalid_url("Audible.Resolve", url, Some(anyhow::anyhow!("{}", e)))
        })?;

        let override_pair = format!("{}=true", OVERRIDE_LANGUAGE);
        let mut segments = strip_override(parsed.query().unwrap_or_default());
        segments.push(&override_pair);
        let query = segments.join("&");

        parsed.set_query(Some(&query));
        Ok(parsed.into())
    }

    async fn extract_message(&self, doc: &Html, _ctx: &RequestContext) -> Result<Message> {
        let [bottom] = check_required_elements(
            OP,
            [(BOTTOM_SELECTOR, select_first(doc, BOTTOM_SELECTOR))],
        )?;

        let book = find_book(bottom)?;

        let mut message = Message::new();
        message.set_title(field(&book, "name").unwrap_or_default());
        message.set_author(names(&book, "author").join(", "));
        if let Some(publisher) = field(&book, "publisher") {
            message.set_publisher(publisher);
        }

        message.add_tag(AUDIOBOOK_TAG);
        let language = field(&book, "inLanguage");
        if is_language_tag_required(&self.localization, language.as_deref()) {
            if let Some(language) = language {
                message.add_tag(language);
            }
        }

        ensure_complete(OP, &message)?;
        Ok(message)
    }
}
