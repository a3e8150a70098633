//! Company record extraction from leaf pages
//!
//! A company page has a mandatory name heading; every other section is optional
//! and becomes an empty string when absent.

use crate::crawler::links::element_text;
use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

const NAME: &str = "h1";
const BUSINESS_TYPE: &str = "h2";
const SOCIAL: &str = "div.winner-section__hero__details__social";
const SOCIAL_LINK: &str = "a";
const ADDRESS: &str = "a.winner-section__hero__details__footer__address";
const ADDRESS_TEXT: &str = "address";
const PHONE: &str = "a.winner-section__hero__details__footer__phone";
const WEBSITE: &str = "a.winner-section__hero__details__footer__url";
const GOOGLE_REVIEWS: &str = "div.winner-section__hero__details__footer__google-reviews__rating";
const GOOGLE_REVIEWS_TEXT: &str = "strong";

/// One row of the output table
///
/// Field order is the column order of the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub country: String,
    pub state: String,
    pub city: String,
    pub company_name: String,
    pub type_of_business: String,
    pub social_media_links: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub google_reviews: String,
}

impl CompanyRecord {
    /// Fills in where in the directory this company was found
    pub fn located(mut self, country: &str, state: &str, city: &str) -> Self {
        self.country = country.to_string();
        self.state = state.to_string();
        self.city = city.to_string();
        self
    }
}

/// Extracts a company record from a leaf page
///
/// Location fields are left empty for the caller to fill in.
///
/// # Errors
///
/// `ExtractError::MalformedPage` if the page has no `<h1>` company name.
pub fn extract_company(document: &Html) -> Result<CompanyRecord, ExtractError> {
    let company_name = first_text(document, NAME, None).ok_or_else(|| {
        ExtractError::MalformedPage("missing primary heading <h1>".to_string())
    })?;
    tracing::debug!("Extracted company name: {}", company_name);

    let type_of_business = first_element(document, BUSINESS_TYPE)
        .map(leading_text)
        .unwrap_or_default();
    tracing::debug!("Extracted type of business: {}", type_of_business);

    let social_media_links = social_links(document).join(", ");
    tracing::debug!("Extracted social media links: {}", social_media_links);

    let address = first_text(document, ADDRESS, Some(ADDRESS_TEXT)).unwrap_or_default();
    tracing::debug!("Extracted address: {}", address);

    let phone = first_text(document, PHONE, None).unwrap_or_default();
    tracing::debug!("Extracted phone: {}", phone);

    let website = first_text(document, WEBSITE, None).unwrap_or_default();
    tracing::debug!("Extracted website: {}", website);

    let google_reviews =
        first_text(document, GOOGLE_REVIEWS, Some(GOOGLE_REVIEWS_TEXT)).unwrap_or_default();
    tracing::debug!("Extracted Google reviews: {}", google_reviews);

    Ok(CompanyRecord {
        company_name,
        type_of_business,
        social_media_links,
        address,
        phone,
        website,
        google_reviews,
        ..CompanyRecord::default()
    })
}

fn first_element<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

/// Trimmed text of the first `css` match, or of its first `inner` descendant
fn first_text(document: &Html, css: &str, inner: Option<&str>) -> Option<String> {
    let element = first_element(document, css)?;

    match inner {
        Some(inner) => {
            let selector = Selector::parse(inner).ok()?;
            element.select(&selector).next().map(element_text)
        }
        None => Some(element_text(element)),
    }
}

/// Trimmed text of an element's first child
///
/// The business type heading may carry trailing markup after the type itself.
fn leading_text(element: ElementRef<'_>) -> String {
    let Some(child) = element.first_child() else {
        return String::new();
    };

    if let Some(text) = child.value().as_text() {
        return text.trim().to_string();
    }

    ElementRef::wrap(child).map(element_text).unwrap_or_default()
}

/// Hrefs of the anchors in the first social section only
fn social_links(document: &Html) -> Vec<String> {
    let Some(section) = first_element(document, SOCIAL) else {
        return Vec::new();
    };
    let Ok(selector) = Selector::parse(SOCIAL_LINK) else {
        return Vec::new();
    };

    section
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .collect()
}
