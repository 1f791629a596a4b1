//! Lazada extraction chain.
//!
//! Lazada serves a client-rendered page whose prices live inside inline
//! page-state JSON (`priceShow`-style ฿-tagged strings and numeric
//! `discountedPrice` fields), so the inline-script tier is tried first,
//! ahead of the price meta tags and the visible-text scan. Title and image
//! follow the same meta-tag chain as the generic extractor.

use scraper::Html;

use crate::extract::fields::{
    cdn_image, first_heading, inline_script_price_text, jsonld_blocks, jsonld_image,
    meta_price_text, og_content, page_title, price_scan_text, strip_query, visible_text,
    ListingFields,
};
use crate::price::{extract_price_range, PriceRules};

const LAZADA_CDN_PATTERNS: &[&str] = &["slatic.net", "lzd-img"];

pub(crate) fn extract_lazada(doc: &Html, rules: &PriceRules) -> ListingFields {
    let title = og_content(doc, "og:title")
        .or_else(|| page_title(doc))
        .or_else(|| first_heading(doc));

    let image = og_content(doc, "og:image")
        .map(|u| strip_query(&u))
        .or_else(|| jsonld_blocks(doc).iter().find_map(jsonld_image))
        .or_else(|| cdn_image(doc, LAZADA_CDN_PATTERNS));

    let context = visible_text(doc);
    let tiers: [(&str, Option<String>); 3] = [
        ("inline-script", inline_script_price_text(doc)),
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
