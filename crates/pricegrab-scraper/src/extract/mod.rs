//! Per-marketplace extraction chains.
//!
//! Each chain tries its field strategies in priority order; the first
//! strategy producing a non-empty value wins for that field, and fields are
//! resolved independently — a title from the first strategy can sit next to
//! an image from the third.

pub mod fields;
mod generic;
mod lazada;
pub mod shopee;

pub use fields::ListingFields;
pub use shopee::{InterceptedCapture, ItemApiCapture, NoApiCapture, ShopeeItem};

use scraper::Html;

use crate::price::PriceRules;
use crate::router::ExtractorKind;

/// Run the HTML extraction chain for `kind` over a fetched document.
///
/// Shopee item pages are not handled here — their payload acquisition chain
/// lives in [`crate::pipeline`]; this entry point covers the HTML-level
/// chains, including the generic fallback Shopee uses for non-item URLs.
#[must_use]
pub fn extract_listing(kind: ExtractorKind, html: &str, rules: &PriceRules) -> ListingFields {
    let doc = Html::parse_document(html);
    match kind {
        ExtractorKind::Generic => generic::extract_generic(&doc, rules),
        ExtractorKind::Lazada => lazada::extract_lazada(&doc, rules),
        ExtractorKind::Shopee => shopee::extract_shopee_html(&doc, rules),
    }
}

/// Shopee's HTML tiers, applied after the payload acquisition chain missed.
pub(crate) fn extract_shopee_page(html: &str, rules: &PriceRules) -> ListingFields {
    if let Some(item) = shopee::payload_from_next_data(html) {
        return shopee::extract_from_next_data(&item, rules);
    }
    let doc = Html::parse_document(html);
    shopee::extract_shopee_html(&doc, rules)
}
