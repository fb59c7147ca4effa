// ABOUTME: Localization table mapping a retailer's display language and localized label to a canonical key.
// ABOUTME: Loaded once from embedded JSON (or a caller-supplied file) and read-only afterwards.

//! Localized label resolution.
//!
//! Retailers render the same product detail under different labels depending
//! on the storefront ("Publisher", "Herausgeber", "Editore", ...). The table
//! maps `(site language, label)` to a canonical key such as `"publisher"`, and
//! maps localized language names to ISO 639-1 codes (`"Deutsch"` -> `"de"`).
//!
//! Matching is case-insensitive on both inputs. The site language is the text
//! of the storefront's locale indicator: surrounding whitespace and a leading
//! `.` are ignored, and an empty indicator selects the default site.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::dom::strip_directional_marks;
use crate::error::{ResolveError, Result};

/// Canonical key for the language detail.
pub const LANGUAGE_KEY: &str = "language";
/// Canonical key for the publisher detail.
pub const PUBLISHER_KEY: &str = "publisher";

const BUILTIN_LOCALIZATION_JSON: &str = include_str!("../data/localization.json");

static BUILTIN_TABLE: Lazy<LocalizationTable> = Lazy::new(|| {
    LocalizationTable::from_json(BUILTIN_LOCALIZATION_JSON)
        .expect("embedded localization table is valid")
});

/// Returns the process-wide table compiled into the crate.
pub fn builtin_table() -> &'static LocalizationTable {
    &BUILTIN_TABLE
}

#[derive(Debug, Deserialize)]
struct TableFile {
    default_site: String,
    #[serde(default)]
    default_languages: Vec<String>,
    #[serde(default)]
    sites: Vec<SiteFile>,
}

#[derive(Debug, Deserialize)]
struct SiteFile {
    locales: Vec<String>,
    #[serde(default)]
    labels: HashMap<String, String>,
}

/// Read-only `(site language, label) -> canonical key` mapping.
#[derive(Debug, Clone)]
pub struct LocalizationTable {
    default_site: String,
    default_languages: HashSet<String>,
    labels: Vec<HashMap<String, String>>,
    locales: HashMap<String, usize>,
}

impl LocalizationTable {
    /// Parses a table from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: TableFile = serde_json::from_str(json).map_err(|e| {
            ResolveError::config(
                "LoadLocalization",
                "json",
                Some(anyhow::anyhow!("invalid localization table: {}", e)),
            )
        })?;
        Self::build(file)
    }

    /// Reads and parses a table from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ResolveError::config(
                "LoadLocalization",
                path.display().to_string(),
                Some(anyhow::anyhow!("failed to read localization table: {}", e)),
            )
        })?;
        Self::from_json(&json)
    }

    fn build(file: TableFile) -> Result<Self> {
        let default_site = normalize_site(&file.default_site);
        let mut labels = Vec::with_capacity(file.sites.len());
        let mut locales = HashMap::new();

        for (idx, site) in file.sites.into_iter().enumerate() {
            for locale in &site.locales {
                let locale = normalize_site(locale);
                if locales.insert(locale.clone(), idx).is_some() {
                    return Err(ResolveError::config(
                        "LoadLocalization",
                        locale,
                        Some(anyhow::anyhow!("locale listed by more than one site")),
                    ));
                }
            }
            labels.push(
                site.labels
                    .into_iter()
                    .map(|(label, key)| (normalize_label(&label), key))
                    .collect(),
            );
        }

        if !locales.contains_key(&default_site) {
            return Err(ResolveError::config(
                "LoadLocalization",
                default_site,
                Some(anyhow::anyhow!("default site has no labels")),
            ));
        }

        Ok(Self {
            default_site,
            default_languages: file
                .default_languages
                .iter()
                .map(|l| normalize_label(l))
                .collect(),
            labels,
            locales,
        })
    }

    /// Looks up the canonical key for `label` on a storefront showing `site_language`.
    ///
    /// Returns `None` for unknown storefronts and unknown labels.
    pub fn lookup(&self, site_language: &str, label: &str) -> Option<&str> {
        let mut site = normalize_site(site_language);
        if site.is_empty() {
            site.clone_from(&self.default_site);
        }
        let idx = *self.locales.get(&site)?;
        self.labels[idx]
            .get(&normalize_label(label))
            .map(String::as_str)
    }

    /// Returns true when `language` needs no explicit tag.
    pub fn is_default_language(&self, language: &str) -> bool {
        self.default_languages.contains(&normalize_label(language))
    }
}

fn normalize_site(site: &str) -> String {
    strip_directional_marks(site)
        .trim()
        .trim_start_matches('.')
        .to_lowercase()
}

fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_loads() {
        let table = builtin_table();
        assert_eq!(table.lookup("", "Language"), Some(LANGUAGE_KEY));
    }

    #[test]
    fn resolves_english_labels_on_default_site() {
        let table = builtin_table();
        assert_eq!(table.lookup("", "Publisher"), Some(PUBLISHER_KEY));
        assert_eq!(table.lookup("  ", "publisher"), Some(PUBLISHER_KEY));
        assert_eq!(table.lookup(".co.uk", "Language"), Some(LANGUAGE_KEY));
        assert_eq!(table.lookup("", "German"), Some("de"));
    }

    #[test]
    fn resolves_localized_labels() {
        let table = builtin_table();
        assert_eq!(table.lookup(".de", "Sprache"), Some(LANGUAGE_KEY));
        assert_eq!(table.lookup("DE", "Herausgeber"), Some(PUBLISHER_KEY));
        assert_eq!(table.lookup(".de", "Englisch"), Some("en"));
        assert_eq!(table.lookup(".it", "Editore"), Some(PUBLISHER_KEY));
        assert_eq!(table.lookup(".fr", "éditeur"), Some(PUBLISHER_KEY));
    }

    #[test]
    fn unknown_pairs_return_none() {
        let table = builtin_table();
        assert_eq!(table.lookup("", "Sprache"), None);
        assert_eq!(table.lookup(".de", "Publisher"), None);
        assert_eq!(table.lookup(".xx", "Language"), None);
        assert_eq!(table.lookup("", ""), None);
        assert_eq!(table.lookup("", "Klingon"), None);
    }

    #[test]
    fn default_languages() {
        let table = builtin_table();
        assert!(table.is_default_language("en"));
        assert!(table.is_default_language("English"));
        assert!(!table.is_default_language("de"));
    }

    #[test]
    fn rejects_duplicate_locales() {
        let json = r#"{
            "default_site": "com",
            "sites": [
                {"locales": ["com"], "labels": {}},
                {"locales": [".COM"], "labels": {}}
            ]
        }"#;
        let err = LocalizationTable::from_json(json).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::Config);
    }

    #[test]
    fn rejects_unknown_default_site() {
        let json = r#"{"default_site": "de", "sites": [{"locales": ["com"]}]}"#;
        assert!(LocalizationTable::from_json(json).is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = LocalizationTable::from_json("{not json").unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::Config);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        std::fs::write(
            &path,
            r#"{
                "default_site": "nl",
                "default_languages": ["nl"],
                "sites": [{"locales": ["nl"], "labels": {"Taal": "language", "Uitgever": "publisher"}}]
            }"#,
        )
        .unwrap();

        let table = LocalizationTable::from_path(&path).unwrap();
        assert_eq!(table.lookup("", "Uitgever"), Some(PUBLISHER_KEY));
        assert!(table.is_default_language("nl"));
        assert!(!table.is_default_language("en"));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = LocalizationTable::from_path("/nonexistent/table.json").unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::Config);
    }
}
