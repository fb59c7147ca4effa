// ABOUTME: Message struct holding the normalized book metadata produced by one extraction.
// ABOUTME: Tags are kept in a set so duplicates collapse and the empty tag is never stored.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Tag attached to every audiobook.
pub const AUDIOBOOK_TAG: &str = "audiobook";
/// Tag attached to titles available through Kindle Unlimited.
pub const KINDLE_UNLIMITED_TAG: &str = "KU";

/// Normalized, retailer-agnostic book metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    title: String,
    author: String,
    publisher: String,
    tags: BTreeSet<String>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
    }

    pub fn set_publisher(&mut self, publisher: impl Into<String>) {
        self.publisher = publisher.into();
    }

    /// Adds a tag. Blank tags are ignored.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        let trimmed = tag.trim();
        if !trimmed.is_empty() {
            self.tags.insert(trimmed.to_string());
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}
