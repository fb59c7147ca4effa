// ABOUTME: Fetch collaborator used by the base resolve behavior, plus its reqwest implementation.
// ABOUTME: Handles request headers, the request-scoped cookie header, size limits, and charset decoding.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tracing::debug;

use crate::error::{ResolveError, Result};

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Per-request data handed to the fetcher and to extraction.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Raw `Cookie` header sent with the request, if any.
    pub cookies: Option<String>,
}

impl RequestContext {
    pub fn with_cookies(cookies: impl Into<String>) -> Self {
        Self {
            cookies: Some(cookies.into()),
        }
    }
}

/// Returns the raw page body at a URL.
#[async_trait(?Send)]
pub trait Fetcher: fmt::Debug {
    async fn fetch(&self, url: &str, ctx: &RequestContext) -> Result<String>;
}

/// `Fetcher` backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    headers: HashMap<String, String>,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client, headers: HashMap<String, String>) -> Self {
        Self { client, headers }
    }
}

#[async_trait(?Send)]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, ctx: &RequestContext) -> Result<String> {
        let parsed = url::Url::parse(url).map_err(|e| {
            ResolveError::invalid_url("Fetch", url, Some(anyhow::anyhow!("invalid URL: {}", e)))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ResolveError::invalid_url(
                "Fetch",
                url,
                Some(anyhow::anyhow!("scheme must be http or https")),
            ));
        }

        let mut request = self.client.get(parsed);
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        if let Some(ref cookies) = ctx.cookies {
            request = request.header(reqwest::header::COOKIE, cookies);
        }

        debug!(url, "fetching page");
        let response = request.send().await.map_err(|e| {
            ResolveError::fetch("Fetch", url, Some(anyhow::anyhow!("request failed: {}", e)))
        })?;

        if let Some(len) = response.content_length() {
            if len as usize > MAX_CONTENT_LENGTH {
                return Err(ResolveError::fetch(
                    "Fetch",
                    url,
                    Some(anyhow::anyhow!("content too large")),
                ));
            }
        }

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());

        let body = response.bytes().await.map_err(|e| {
            ResolveError::fetch(
                "Fetch",
                url,
                Some(anyhow::anyhow!("failed to read body: {}", e)),
            )
        })?;

        if body.len() > MAX_CONTENT_LENGTH {
            return Err(ResolveError::fetch(
                "Fetch",
                url,
                Some(anyhow::anyhow!("content too large")),
            ));
        }

        if status != 200 {
            return Err(ResolveError::fetch(
                "Fetch",
                url,
                Some(anyhow::anyhow!("HTTP status {}", status)),
            ));
        }

        debug!(url, status, bytes = body.len(), "fetched page");
        Ok(decode_body(&body, content_type.as_deref()))
    }
}

/// Decodes a page body.
///
/// Precedence: byte-order mark, then the `charset` parameter of the
/// content type, then statistical detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = Encoding::for_bom(body)
        .map(|(encoding, _)| encoding)
        .or_else(|| content_type.and_then(declared_charset).and_then(encoding_for))
        .unwrap_or_else(|| sniff_encoding(body));

    let (decoded, _, malformed) = encoding.decode(body);
    if malformed {
        debug!(encoding = encoding.name(), "body contained malformed sequences");
    }
    decoded.into_owned()
}

fn encoding_for(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.as_bytes())
}

fn sniff_encoding(body: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(body, true);
    detector.guess(None, true)
}

/// Returns the `charset` parameter of a Content-Type value, unquoted.
fn declared_charset(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches(['"', '\'']))
        .filter(|value| !value.is_empty())
}
