//! Navigation link extraction
//!
//! Directory pages list their children as anchors wrapping a label element
//! (countries, states, cities) or as headings wrapping an anchor (companies).
//! Entries that don't have the expected shape are skipped with a warning.

use crate::config::SelectorConfig;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A link to the next level of the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationLink {
    /// Absolute target URL
    pub url: Url,

    /// Trimmed label text (country, state or city name)
    pub label: String,
}

/// Compiled selectors for the navigation levels
#[derive(Debug, Clone)]
pub struct NavigationSelectors {
    link: Selector,
    label: Selector,
    business_heading: Selector,
    anchor: Selector,
}

impl NavigationSelectors {
    /// Compiles the configured selectors
    pub fn from_config(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            link: parse_selector(&config.navigation_link)?,
            label: parse_selector(&config.navigation_label)?,
            business_heading: parse_selector(&config.business_heading)?,
            anchor: parse_selector("a")?,
        })
    }
}

fn parse_selector(css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css).map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", css, e)))
}

/// Extracts country, state or city links from a listing page
///
/// Returns the links in document order. An anchor without the label element or
/// without a usable `href` is skipped.
pub fn extract_navigation_links(
    document: &Html,
    base_url: &Url,
    selectors: &NavigationSelectors,
) -> Vec<NavigationLink> {
    let mut links = Vec::new();

    for anchor in document.select(&selectors.link) {
        let href = anchor.value().attr("href").unwrap_or_default();

        let Some(label) = anchor.select(&selectors.label).next() else {
            tracing::warn!("No label element found in link: {}", href);
            continue;
        };

        let Some(url) = resolve_link(href, base_url) else {
            tracing::warn!("Skipping navigation link with unusable href: '{}'", href);
            continue;
        };

        links.push(NavigationLink {
            url,
            label: element_text(label),
        });
    }

    tracing::info!("Extracted {} navigation links from {}", links.len(), base_url);
    links
}

/// Extracts company page links from a city page
///
/// Each matching heading contributes the `href` of its first anchor, in document order.
pub fn extract_business_links(
    document: &Html,
    base_url: &Url,
    selectors: &NavigationSelectors,
) -> Vec<Url> {
    let mut links = Vec::new();

    for heading in document.select(&selectors.business_heading) {
        let Some(anchor) = heading.select(&selectors.anchor).next() else {
            tracing::warn!("No anchor found in business heading on {}", base_url);
            continue;
        };

        let href = anchor.value().attr("href").unwrap_or_default();
        match resolve_link(href, base_url) {
            Some(url) => links.push(url),
            None => tracing::warn!("Skipping business link with unusable href: '{}'", href),
        }
    }

    tracing::info!("Extracted {} business links from {}", links.len(), base_url);
    links
}

/// Concatenated, trimmed text of an element
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}
