//! Generic extraction chain: Alibaba/1688 and any unrecognized host.
//!
//! Title: `og:title` → `<title>` → first `<h1>`.
//! Image: `og:image` (query suffix stripped) → structured-data
//! `image`/`thumbnailUrl` → first CDN-hosted `<img>`.
//! Price: JSON-LD offers → price meta tags → visible-text scan. Tiers are
//! tried in trust order; a tier whose text yields no plausible candidate is
//! skipped entirely.

use scraper::Html;

use crate::extract::fields::{
    cdn_image, first_heading, jsonld_blocks, jsonld_image, jsonld_offer_price_text,
    meta_price_text, og_content, page_title, price_scan_text, strip_query, visible_text,
    ListingFields,
};
use crate::price::{extract_price_range, PriceRules};

/// Alibaba-family image CDN hosts; the generic fallback also accepts common
/// storefront CDN naming.
const ALIBABA_CDN_PATTERNS: &[&str] = &["alicdn.com", "cdn", "img"];

pub(crate) fn extract_generic(doc: &Html, rules: &PriceRules) -> ListingFields {
    let title = og_content(doc, "og:title")
        .or_else(|| page_title(doc))
        .or_else(|| first_heading(doc));

    let blocks = jsonld_blocks(doc);

    let image = og_content(doc, "og:image")
        .map(|u| strip_query(&u))
        .or_else(|| blocks.iter().find_map(jsonld_image))
        .or_else(|| cdn_image(doc, ALIBABA_CDN_PATTERNS));

    let context = visible_text(doc);
    let tiers: [(&str, Option<String>); 3] = [
        (
            "jsonld-offers",
            blocks.iter().find_map(jsonld_offer_price_text),
        ),
        ("price-meta", meta_price_text(doc)),
        ("visible-text", Some(price_scan_text(doc))),
    ];

    let mut price_text = None;
    let mut price = None;
    for (tier, text) in tiers {
        let Some(text) = text else { continue };
        if let Some(range) = extract_price_range(&text, &context, rules) {
            tracing::debug!(tier, "price tier accepted");
            price_text = Some(text);
            price = Some(range);
            break;
        }
    }

    ListingFields {
        title,
        image,
        price_text,
        price,
    }
}
