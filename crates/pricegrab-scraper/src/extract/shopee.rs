//! Shopee extraction chain.
//!
//! Shopee pages are client-rendered, so the payload itself has to be
//! acquired before any field extraction: (1) an item-detail API response
//! captured during page load, (2) the `__NEXT_DATA__` page-state block
//! embedded in the served HTML, (3) plain meta/JSON-LD scraping of the HTML.
//! The capture mechanism is pluggable through [`ItemApiCapture`] so browser
//! automation can be swapped out or stubbed.
//!
//! Prices in Shopee payloads are fixed-point integers scaled by 100 000;
//! some payload variants carry an even larger scale that a second division
//! corrects.

use std::future::Future;
use std::pin::Pin;

use regex::Regex;
use rust_decimal::Decimal;
use scraper::Html;
use serde::Deserialize;
use tokio::sync::{mpsc, Mutex};

use crate::extract::fields::{
    og_content, page_title, price_scan_text, strip_query, visible_text, ListingFields,
};
use crate::extract::fields::{jsonld_blocks, jsonld_offer_price_text};
use crate::price::{extract_price_range, PriceRules};

const FIXED_POINT_SCALE: i64 = 100_000;
const DOUBLE_SCALE_THRESHOLD: i64 = 1_000_000;
const IMAGE_CDN_BASE: &str = "https://cf.shopee.co.th/file/";

/// Shop and item identifiers parsed from a product URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRef {
    pub shop_id: u64,
    pub item_id: u64,
}

/// Parse the two known item URL shapes: `/product/{shopId}/{itemId}` and the
/// slug form `…-i.{shopId}.{itemId}`. URLs matching neither (search pages,
/// category pages) are handled by the generic chain instead.
#[must_use]
pub fn parse_item_ref(url: &str) -> Option<ItemRef> {
    let path = reqwest::Url::parse(url).ok()?.path().to_owned();

    let product_re = Regex::new(r"/product/(\d+)/(\d+)").expect("valid regex");
    let slug_re = Regex::new(r"(?:^|[-/.])i\.(\d+)\.(\d+)/?$").expect("valid regex");

    let caps = product_re
        .captures(&path)
        .or_else(|| slug_re.captures(&path))?;
    Some(ItemRef {
        shop_id: caps.get(1)?.as_str().parse().ok()?,
        item_id: caps.get(2)?.as_str().parse().ok()?,
    })
}

/// True for background responses from the item-detail API endpoint; capture
/// implementations use this to decide which responses to queue.
#[must_use]
pub fn is_item_api_url(url: &str) -> bool {
    url.contains("api/v4/item/get")
}

/// Source of captured item-detail API payloads.
///
/// A real implementation drives a browser and queues intercepted responses;
/// tests push canned payloads. Returning `None` sends the pipeline down the
/// `__NEXT_DATA__`/HTML tiers.
pub trait ItemApiCapture: Send + Sync {
    fn capture_item_payload<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<serde_json::Value>> + Send + 'a>>;
}

/// Capture source for plain-HTTP runs: never yields a payload.
pub struct NoApiCapture;

impl ItemApiCapture for NoApiCapture {
    fn capture_item_payload<'a>(
        &'a self,
        _url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<serde_json::Value>> + Send + 'a>> {
        Box::pin(async { None })
    }
}

/// Channel-backed capture source. An interception handler (or a test) pushes
/// payloads through the sender; the first payload captured for a navigation
/// is authoritative and later ones are discarded.
pub struct InterceptedCapture {
    rx: Mutex<mpsc::UnboundedReceiver<serde_json::Value>>,
}

impl InterceptedCapture {
    #[must_use]
    pub fn channel() -> (mpsc::UnboundedSender<serde_json::Value>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx: Mutex::new(rx) })
    }
}

impl ItemApiCapture for InterceptedCapture {
    fn capture_item_payload<'a>(
        &'a self,
        _url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<serde_json::Value>> + Send + 'a>> {
        Box::pin(async {
            let mut rx = self.rx.lock().await;
            let first = rx.try_recv().ok();
            // Later captures belong to the same navigation; drop them so the
            // next navigation starts clean.
            while rx.try_recv().is_ok() {}
            first
        })
    }
}

/// The item fields the Shopee strategies read. Every field is optional;
/// absence of one degrades only the output that depends on it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopeeItem {
    pub itemid: Option<i64>,
    pub name: Option<String>,
    /// Primary image id; rendered into a CDN URL.
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub price: Option<i64>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
}

/// Undo the fixed-point encoding: divide by 100 000, and once more when the
/// result still exceeds 1 000 000 — those payloads carry a double scale.
pub(crate) fn descale_fixed_point(raw: i64) -> Decimal {
    let mut value = Decimal::from(raw) / Decimal::from(FIXED_POINT_SCALE);
    if value > Decimal::from(DOUBLE_SCALE_THRESHOLD) {
        value /= Decimal::from(FIXED_POINT_SCALE);
    }
    value
}

/// `__NEXT_DATA__` payloads carry prices either already in currency units or
/// in the fixed-point encoding; only values past the threshold get descaled.
pub(crate) fn next_data_price(raw: i64) -> Decimal {
    if raw > DOUBLE_SCALE_THRESHOLD {
        descale_fixed_point(raw)
    } else {
        Decimal::from(raw)
    }
}

fn image_url_from_id(id: &str) -> String {
    format!("{IMAGE_CDN_BASE}{id}_tn")
}

/// Tier 1: fields from a captured item-detail API response. The interesting
/// content sits under `data`; payloads without an `itemid` are treated as
/// misses so the chain continues.
pub(crate) fn extract_from_api_payload(
    payload: &serde_json::Value,
    rules: &PriceRules,
) -> Option<ListingFields> {
    let data = payload.get("data").unwrap_or(payload);
    let item: ShopeeItem = serde_json::from_value(data.clone()).ok()?;
    item.itemid?;
    tracing::debug!(itemid = item.itemid, "extracting from captured API payload");
    Some(fields_from_item(&item, descale_fixed_point, rules))
}

/// Tier 2: fields from the embedded `__NEXT_DATA__` page state.
pub(crate) fn extract_from_next_data(item: &ShopeeItem, rules: &PriceRules) -> ListingFields {
    fields_from_item(item, next_data_price, rules)
}

/// Locate and parse the `__NEXT_DATA__` block, returning the item record
/// under `props.pageProps.itemData` or `props.pageProps.item`. Malformed
/// JSON abandons this tier.
pub(crate) fn payload_from_next_data(html: &str) -> Option<ShopeeItem> {
    let re = Regex::new(r#"(?is)<script[^>]*id="__NEXT_DATA__"[^>]*>(.*?)</script>"#)
        .expect("valid regex");
    let json_text = re.captures(html)?.get(1)?.as_str();
    let value: serde_json::Value = match serde_json::from_str(json_text) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "malformed __NEXT_DATA__ block");
            return None;
        }
    };
    let page_props = value.get("props")?.get("pageProps")?;
    let item_node = page_props
        .get("itemData")
        .filter(|v| !v.is_null() && v.as_object().is_none_or(|o| !o.is_empty()))
        .or_else(|| page_props.get("item"))?;
    serde_json::from_value(item_node.clone()).ok()
}

fn fields_from_item(
    item: &ShopeeItem,
    scale: fn(i64) -> Decimal,
    rules: &PriceRules,
) -> ListingFields {
    let image = item
        .image
        .as_deref()
        .or_else(|| item.images.first().map(String::as_str))
        .map(image_url_from_id);

    let min_raw = item.price_min.or(item.price);
    let max_raw = item.price_max.or(min_raw);

    let (price_text, price) = match (min_raw, max_raw) {
        (Some(min), Some(max)) => {
            let text = format!("THB {} - THB {}", scale(min), scale(max));
            let range = extract_price_range(&text, &text, rules);
            (Some(text), range)
        }
        _ => (None, None),
    };

    ListingFields {
        title: item.name.clone(),
        image,
        price_text,
        price,
    }
}

/// Tier 3: plain HTML scraping, for pages served without usable page state.
/// Offers in Shopee's JSON-LD rarely declare a currency; amounts default to
/// THB, matching the storefront.
pub(crate) fn extract_shopee_html(doc: &Html, rules: &PriceRules) -> ListingFields {
    let title = og_content(doc, "og:title").or_else(|| page_title(doc));
    let image = og_content(doc, "og:image").map(|u| strip_query(&u));

    let context = visible_text(doc);
    let blocks = jsonld_blocks(doc);
    let jsonld_text = blocks.iter().find_map(jsonld_offer_price_text).map(|t| {
        if t.contains("price ") {
            // No declared currency: this is a Thai storefront.
            t.replace("price ", "THB ")
        } else {
            t
        }
    });

    let tiers: [(&str, Option<String>); 2] = [
        ("jsonld-offers", jsonld_text),
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

#[cfg(test)]
#[path = "shopee_test.rs"]
mod tests;
