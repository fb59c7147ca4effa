// ABOUTME: Error types for book metadata resolution including the ErrorCode enum and ResolveError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing the distinct ways a resolution can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A required DOM node or structured-data record is absent.
    MissingStructure,
    /// The page describes a product of the wrong format.
    UnsupportedFormat,
    /// A detail item exists but is not a clean label/value pair.
    MalformedDetail,
    /// An optional enrichment lookup failed. Never surfaced by extraction.
    Enrichment,
    InvalidUrl,
    Fetch,
    UnknownRetailer,
    Config,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::MissingStructure => "page structure changed",
            ErrorCode::UnsupportedFormat => "unsupported format",
            ErrorCode::MalformedDetail => "malformed product detail",
            ErrorCode::Enrichment => "enrichment failed",
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::UnknownRetailer => "unknown retailer",
            ErrorCode::Config => "configuration error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for resolve and extraction operations.
///
/// `op` names the pipeline step that failed, `target` names the selector,
/// record or URL it was working on.
#[derive(Debug, thiserror::Error)]
pub struct ResolveError {
    pub code: ErrorCode,
    pub op: String,
    pub target: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bookmeta: {} {}: {}", self.op, self.target, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ResolveError {
    fn with_code(
        code: ErrorCode,
        op: impl Into<String>,
        target: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            op: op.into(),
            target: target.into(),
            source,
        }
    }

    /// Create a MissingStructure error.
    pub fn missing_structure(
        op: impl Into<String>,
        target: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::MissingStructure, op, target, source)
    }

    /// Create an UnsupportedFormat error.
    pub fn unsupported_format(
        op: impl Into<String>,
        target: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::UnsupportedFormat, op, target, source)
    }

    /// Create a MalformedDetail error.
    pub fn malformed_detail(
        op: impl Into<String>,
        target: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::MalformedDetail, op, target, source)
    }

    /// Create an Enrichment error.
    pub fn enrichment(
        op: impl Into<String>,
        target: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Enrichment, op, target, source)
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        op: impl Into<String>,
        url: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::InvalidUrl, op, url, source)
    }

    /// Create a Fetch error.
    pub fn fetch(
        op: impl Into<String>,
        url: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Fetch, op, url, source)
    }

    /// Create an UnknownRetailer error.
    pub fn unknown_retailer(op: impl Into<String>, url: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::UnknownRetailer, op, url, None)
    }

    /// Create a Config error.
    pub fn config(
        op: impl Into<String>,
        target: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Config, op, target, source)
    }

    /// Returns true if this is a MissingStructure error.
    pub fn is_missing_structure(&self) -> bool {
        self.code == ErrorCode::MissingStructure
    }

    /// Returns true if this is an UnsupportedFormat error.
    pub fn is_unsupported_format(&self) -> bool {
        self.code == ErrorCode::UnsupportedFormat
    }

    /// Returns true if this is a MalformedDetail error.
    pub fn is_malformed_detail(&self) -> bool {
        self.code == ErrorCode::MalformedDetail
    }

    /// Returns true if this is an Enrichment error.
    pub fn is_enrichment(&self) -> bool {
        self.code == ErrorCode::Enrichment
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    /// Returns true if this is an UnknownRetailer error.
    pub fn is_unknown_retailer(&self) -> bool {
        self.code == ErrorCode::UnknownRetailer
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_op_target_and_code() {
        let err = ResolveError::missing_structure("Amazon.ExtractMessage", "#productTitle", None);
        assert_eq!(
            err.to_string(),
            "bookmeta: Amazon.ExtractMessage #productTitle: page structure changed"
        );
    }

    #[test]
    fn display_appends_source() {
        let err = ResolveError::fetch(
            "Fetch",
            "https://example.com",
            Some(anyhow::anyhow!("HTTP status 503")),
        );
        assert!(err.to_string().ends_with("fetch error: HTTP status 503"));
        assert!(err.is_fetch());
        assert!(!err.is_missing_structure());
    }

    #[test]
    fn source_is_exposed_through_std_error() {
        use std::error::Error;
        let err = ResolveError::malformed_detail(
            "Amazon.Details",
            "li",
            Some(anyhow::anyhow!("expected 2 spans, found 3")),
        );
        assert!(err.source().is_some());
        assert!(err.is_malformed_detail());
    }
}
