// ABOUTME: Integration tests for the Audible resolver's JSON-LD extraction.
// ABOUTME: Covers record disambiguation, author joining, language tagging, and missing-record failures.

use std::collections::BTreeSet;
use std::fs;
use std::sync::Arc;

use bookmeta::{
    builtin_table, AudibleResolver, ErrorCode, RequestContext, Resolver, AUDIOBOOK_TAG,
};
use pretty_assertions::assert_eq;
use scraper::Html;

fn load_html_fixture(name: &str) -> String {
    let path = format!(
        "{}/tests/fixtures/html/{}.html",
        env!("CARGO_MANIFEST_DIR"),
        name
    );
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read HTML fixture: {}", path))
}

async fn extract(html: &str) -> bookmeta::Result<bookmeta::Message> {
    let doc = Html::parse_document(html);
    AudibleResolver::new(Arc::new(builtin_table().clone()))
        .extract_message(&doc, &RequestContext::default())
        .await
}

fn page(scripts: &[&str]) -> String {
    let blocks: String = scripts
        .iter()
        .map(|s| format!(r#"<script type="application/ld+json">{}</script>"#, s))
        .collect();
    format!(r#"<html><body><div id="bottom-0">{}</div></body></html>"#, blocks)
}

fn tags(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn extracts_book_record_from_fixture() {
    let message = extract(&load_html_fixture("audible_book")).await.unwrap();

    assert_eq!(message.title(), "Dune");
    assert_eq!(message.author(), "Frank Herbert");
    assert_eq!(message.publisher(), "Macmillan Audio");
    assert_eq!(message.tags(), &tags(&[AUDIOBOOK_TAG]));
}

#[tokio::test]
async fn keeps_special_characters_from_fixture() {
    let message = extract(&load_html_fixture("audible_book_entities")).await.unwrap();

    assert_eq!(
        message.title(),
        "Cien años de soledad & otros cuentos <Edición especial>"
    );
    assert_eq!(message.author(), "Gabriel García Márquez");
    assert_eq!(
        message.publisher(),
        "Penguin Random House Grupo Editorial & Audio"
    );
    assert_eq!(message.tags(), &tags(&[AUDIOBOOK_TAG, "es"]));
}

#[tokio::test]
async fn script_text_is_not_html_escaped() {
    let html = page(&[r#"[{
        "bookFormat": "AudiobookFormat",
        "name": "A <b>bold</b> title & more",
        "author": [{"name": "Jane Austen"}, {"name": "Brontë & Co"}],
        "publisher": "Simon & Schuster Audio"
    }]"#]);
    let message = extract(&html).await.unwrap();

    assert_eq!(message.title(), "A <b>bold</b> title & more");
    assert_eq!(message.author(), "Jane Austen, Brontë & Co");
    assert_eq!(message.publisher(), "Simon & Schuster Audio");
}

#[tokio::test]
async fn structured_publisher_and_language_are_read_by_name() {
    let html = page(&[r#"[{
        "bookFormat": "AudiobookFormat",
        "name": "Dune",
        "author": {"@type": "Person", "name": "Frank Herbert"},
        "publisher": {"@type": "Organization", "name": "Macmillan Audio"},
        "inLanguage": {"@type": "Language", "name": "de"}
    }]"#]);
    let message = extract(&html).await.unwrap();

    assert_eq!(message.publisher(), "Macmillan Audio");
    assert_eq!(message.tags(), &tags(&[AUDIOBOOK_TAG, "de"]));
}

#[tokio::test]
async fn unreadable_optional_fields_are_left_empty() {
    let html = page(&[r#"[{
        "bookFormat": "AudiobookFormat",
        "name": "Dune",
        "author": [{"name": "Frank Herbert"}],
        "publisher": ["Macmillan Audio", "Audible Studios"],
        "inLanguage": 7
    }]"#]);
    let message = extract(&html).await.unwrap();

    assert_eq!(message.title(), "Dune");
    assert_eq!(message.publisher(), "");
    assert_eq!(message.tags(), &tags(&[AUDIOBOOK_TAG]));
}

#[tokio::test]
async fn joins_multiple_authors_in_order() {
    let html = page(&[r#"[{
        "@type": "Audiobook",
        "bookFormat": "AudiobookFormat",
        "name": "Good Omens",
        "author": [{"name": "Terry Pratchett"}, {"name": "Neil Gaiman"}],
        "publisher": "HarperAudio",
        "inLanguage": "en"
    }]"#]);
    let message = extract(&html).await.unwrap();

    assert_eq!(message.author(), "Terry Pratchett, Neil Gaiman");
    assert_eq!(message.tags(), &tags(&[AUDIOBOOK_TAG]));
}

#[tokio::test]
async fn non_default_language_is_tagged() {
    let html = page(&[r#"[{
        "bookFormat": "AudiobookFormat",
        "name": "Der Process",
        "author": [{"name": "Franz Kafka"}],
        "publisher": "Audiobuch",
        "inLanguage": "de"
    }]"#]);
    let message = extract(&html).await.unwrap();
    assert_eq!(message.tags(), &tags(&[AUDIOBOOK_TAG, "de"]));
}

#[tokio::test]
async fn first_record_with_book_format_wins() {
    let html = page(&[
        r#"{"@type": "Organization", "name": "Audible"}"#,
        r#"[{"@type": "BreadcrumbList"}, {"bookFormat": "AudiobookFormat", "name": "First", "author": [{"name": "A"}]}]"#,
        r#"[{"bookFormat": "AudiobookFormat", "name": "Second", "author": [{"name": "B"}]}]"#,
    ]);
    let message = extract(&html).await.unwrap();
    assert_eq!(message.title(), "First");
    assert_eq!(message.publisher(), "");
}

#[tokio::test]
async fn unparseable_scripts_are_skipped() {
    let html = page(&[
        "window.dataLayer = window.dataLayer || [];",
        r#"[{"bookFormat": "AudiobookFormat", "name": "Dune", "author": {"name": "Frank Herbert"}}]"#,
    ]);
    let message = extract(&html).await.unwrap();
    assert_eq!(message.author(), "Frank Herbert");
}

#[tokio::test]
async fn no_book_format_record_is_missing_structure() {
    let html = page(&[
        r#"[{"@type": "BreadcrumbList"}]"#,
        r#"[{"@type": "Product", "name": "Gift card", "bookFormat": null}]"#,
    ]);
    let err = extract(&html).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingStructure);
    assert!(err.to_string().contains("cannot get audiobook information"));
}

#[tokio::test]
async fn zero_scripts_is_missing_structure() {
    let err = extract(&page(&[])).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingStructure);
}

#[tokio::test]
async fn missing_container_is_missing_structure() {
    let err = extract("<html><body><div id='bottom-1'></div></body></html>")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingStructure);
    assert_eq!(err.target, "#bottom-0");
}

#[tokio::test]
async fn record_without_name_is_missing_structure() {
    let html = page(&[r#"[{"bookFormat": "AudiobookFormat", "author": [{"name": "Anon"}]}]"#]);
    let err = extract(&html).await.unwrap_err();
    assert!(err.is_missing_structure());
}

#[tokio::test]
async fn record_without_authors_is_missing_structure() {
    let html = page(&[r#"[{"bookFormat": "AudiobookFormat", "name": "Anonymous", "author": []}]"#]);
    let err = extract(&html).await.unwrap_err();
    assert!(err.is_missing_structure());
    assert_eq!(err.target, "author");
}
