// ABOUTME: Pre-compiled CSS selector cache and the query helpers built on it.
// ABOUTME: Eliminates repeated parsing of the fixed selectors each resolver uses per page.

//! Selector caching for repeated DOM queries.
//!
//! Every resolver queries the same handful of selectors on every page, so
//! selectors are compiled once and reused. Invalid selectors are cached as
//! `None` and behave like a selector that matches nothing.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `Some(Selector)` if the selector is valid, `None` if invalid.
pub fn get_or_compile(css: &str) -> Option<Selector> {
    {
        let cache = SELECTOR_CACHE.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = Selector::parse(css).ok();
    let mut cache = SELECTOR_CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    // Another thread may have inserted while we were compiling
    if let Some(cached) = cache.get(css) {
        return cached.clone();
    }
    cache.insert(css.to_string(), compiled.clone());
    compiled
}

/// Returns the first element in the document matching `css`.
pub fn select_first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = get_or_compile(css)?;
    doc.select(&selector).next()
}

/// Returns the first element below `scope` matching `css`.
pub fn select_first_in<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    select_all_in(scope, css).into_iter().next()
}

/// Returns every element below `scope` matching `css`, in document order.
///
/// `scope` itself is never part of the result.
pub fn select_all_in<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    let selector = match get_or_compile(css) {
        Some(s) => s,
        None => return vec![],
    };

    scope
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| selector.matches(el))
        .collect()
}

/// Returns every descendant element of `scope` with the given tag name.
pub fn descendants_named<'a>(scope: ElementRef<'a>, tag: &str) -> Vec<ElementRef<'a>> {
    scope
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name().eq_ignore_ascii_case(tag))
        .collect()
}
