//! Field types and shared DOM/JSON helpers used by every extraction chain.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::price::PriceRange;

/// Fields pulled from one listing page. All independently optional — a
/// missing price does not invalidate a found title.
#[derive(Debug, Clone, Default)]
pub struct ListingFields {
    pub title: Option<String>,
    pub image: Option<String>,
    /// Raw text of the price tier that won the strategy chain.
    pub price_text: Option<String>,
    /// Range parsed from `price_text` at extraction time, with the page
    /// context that was in scope then.
    pub price: Option<PriceRange>,
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim().to_owned();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// `<meta property="...">` content, e.g. `og:title`.
pub(crate) fn og_content(doc: &Html, property: &str) -> Option<String> {
    let sel = selector(&format!(r#"meta[property="{property}"]"#));
    doc.select(&sel)
        .find_map(|el| el.value().attr("content").map(str::to_owned))
        .and_then(non_empty)
}

pub(crate) fn page_title(doc: &Html) -> Option<String> {
    let sel = selector("title");
    doc.select(&sel)
        .next()
        .map(|el| el.text().collect::<String>())
        .and_then(non_empty)
}

pub(crate) fn first_heading(doc: &Html) -> Option<String> {
    let sel = selector("h1");
    doc.select(&sel)
        .next()
        .map(|el| el.text().collect::<String>())
        .and_then(non_empty)
}

/// Drop the query-string suffix CDNs append for resizing/tracking.
pub(crate) fn strip_query(url: &str) -> String {
    url.split('?').next().unwrap_or(url).to_owned()
}

/// Meta-tag price tier: `product:price:amount` / `og:price:amount` rendered
/// with their currency meta so the normalizer can re-read them. Amounts with
/// no currency meta are rendered behind a `price` keyword instead and left
/// to context-based currency detection.
pub(crate) fn meta_price_text(doc: &Html) -> Option<String> {
    let amounts: Vec<String> = ["product:price:amount", "og:price:amount"]
        .iter()
        .filter_map(|p| og_content(doc, p))
        .collect();
    if amounts.is_empty() {
        return None;
    }
    let currency = ["product:price:currency", "og:price:currency"]
        .iter()
        .find_map(|p| og_content(doc, p));

    let rendered: Vec<String> = amounts
        .into_iter()
        .map(|a| match &currency {
            Some(code) => format!("{code} {a}"),
            None => format!("price {a}"),
        })
        .collect();
    Some(rendered.join(" "))
}

/// All `<script type="application/ld+json">` payloads, with top-level arrays
/// and `@graph` containers flattened. Blocks that fail to parse are skipped —
/// a malformed strategy tier is abandoned, not fatal.
pub(crate) fn jsonld_blocks(doc: &Html) -> Vec<serde_json::Value> {
    let sel = selector(r#"script[type="application/ld+json"]"#);
    let mut blocks = Vec::new();
    for el in doc.select(&sel) {
        let text: String = el.text().collect();
        let value: serde_json::Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed JSON-LD block");
                continue;
            }
        };
        match value {
            serde_json::Value::Array(items) => blocks.extend(items),
            other => blocks.push(other),
        }
    }
    let mut expanded = Vec::new();
    for block in &blocks {
        if let Some(graph) = block.get("@graph").and_then(serde_json::Value::as_array) {
            expanded.extend(graph.iter().cloned());
        }
    }
    blocks.extend(expanded);
    blocks
}

/// `image`/`thumbnailUrl` inside a structured-data block. `image` appears in
/// the wild as a string, an array of strings, or an `ImageObject`.
pub(crate) fn jsonld_image(block: &serde_json::Value) -> Option<String> {
    let node = block.get("image").or_else(|| block.get("thumbnailUrl"))?;
    let url = match node {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => items
            .iter()
            .find_map(|v| v.as_str().map(str::to_owned)),
        serde_json::Value::Object(_) => node
            .get("url")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned),
        _ => None,
    }?;
    non_empty(url)
}

/// Offer prices from a `Product` structured-data block, rendered for the
/// normalizer. Reads `offers.lowPrice`/`highPrice` or `offers.price`, with
/// `offers.priceCurrency` tagging the amounts when declared.
pub(crate) fn jsonld_offer_price_text(block: &serde_json::Value) -> Option<String> {
    let type_matches = block
        .get("@type")
        .is_some_and(|t| match t {
            serde_json::Value::String(s) => s.eq_ignore_ascii_case("Product"),
            serde_json::Value::Array(arr) => arr
                .iter()
                .filter_map(|v| v.as_str())
                .any(|s| s.eq_ignore_ascii_case("Product")),
            _ => false,
        });
    if !type_matches {
        return None;
    }

    let offers = block.get("offers")?;
    // `offers` may be a single object or an array; take the first.
    let offer = if let Some(arr) = offers.as_array() {
        arr.first()?
    } else {
        offers
    };

    let currency = offer
        .get("priceCurrency")
        .and_then(serde_json::Value::as_str);
    let tag = |amount: &str| match currency {
        Some(code) => format!("{code} {amount}"),
        None => format!("price {amount}"),
    };

    let low = offer.get("lowPrice").map(json_number_string);
    let high = offer.get("highPrice").map(json_number_string);
    if let (Some(Some(low)), Some(Some(high))) = (low, high) {
        return Some(format!("{} {}", tag(&low), tag(&high)));
    }
    let price = offer.get("price").and_then(json_number_string)?;
    Some(tag(&price))
}

fn json_number_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Inline-script price tier: scan `<script>` bodies for the named price
/// fields marketplaces embed in their page-state JSON, plus any
/// currency-tagged amounts inside those scripts.
pub(crate) fn inline_script_price_text(doc: &Html) -> Option<String> {
    let field_re = Regex::new(
        r#"(?i)"(?:price_min|price_max|offerPrice|discountedPrice|price)"\s*:\s*"?([0-9][0-9,.]*)"?"#,
    )
    .expect("valid regex");
    let tagged_re =
        Regex::new(r"(?i)(?:THB|฿|USD|\$)\s*[0-9][0-9,.]*").expect("valid regex");

    let sel = selector("script");
    let mut parts: Vec<String> = Vec::new();
    for el in doc.select(&sel) {
        let content: String = el.text().collect();
        if content.is_empty() {
            continue;
        }
        for cap in field_re.captures_iter(&content) {
            if let Some(m) = cap.get(1) {
                parts.push(format!("price {}", m.as_str()));
            }
        }
        for m in tagged_re.find_iter(&content) {
            parts.push(m.as_str().to_owned());
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// First `<img>` whose source matches one of the marketplace's CDN host
/// patterns, preferring the large renditions. The query-string suffix is
/// stripped.
pub(crate) fn cdn_image(doc: &Html, patterns: &[&str]) -> Option<String> {
    let sel = selector("img");
    let sources: Vec<String> = doc
        .select(&sel)
        .filter_map(|el| {
            el.value()
                .attr("src")
                .or_else(|| el.value().attr("data-src"))
                .map(str::to_owned)
        })
        .filter(|src| patterns.iter().any(|p| src.contains(p)))
        .collect();

    sources
        .iter()
        .find(|src| src.contains("800x800") || src.contains("600x600"))
        .or_else(|| sources.first())
        .map(|src| strip_query(src))
}

/// Visible-text price tier: concatenated text of elements whose class name
/// or own text matches price-related keywords. Script and style subtrees are
/// excluded so embedded JSON never leaks into this scan.
pub(crate) fn price_scan_text(doc: &Html) -> String {
    let class_re = Regex::new(r"(?i)price|amount|range").expect("valid regex");
    let text_re = Regex::new(r"(?i)\bprice\b|\bTHB\b|\bUSD\b|[฿$]").expect("valid regex");

    let sel = selector("*");
    let mut out = String::new();
    for el in doc.select(&sel) {
        if is_non_visible(el.value().name()) {
            continue;
        }
        let class_hit = el
            .value()
            .attr("class")
            .is_some_and(|c| class_re.is_match(c));
        if class_hit {
            element_visible_text(el, &mut out);
            continue;
        }
        let direct: String = direct_text(el);
        if text_re.is_match(&direct) {
            out.push_str(&direct);
            out.push(' ');
        }
    }
    out
}

/// The whole page's visible text — the currency-detection context.
pub(crate) fn visible_text(doc: &Html) -> String {
    let mut out = String::new();
    element_visible_text(doc.root_element(), &mut out);
    out
}

fn is_non_visible(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "noscript")
}

fn direct_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in el.children() {
        if let Some(t) = child.value().as_text() {
            out.push_str(t);
            out.push(' ');
        }
    }
    out
}

fn element_visible_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            if is_non_visible(child_el.value().name()) {
                continue;
            }
            element_visible_text(child_el, out);
        } else if let Some(t) = child.value().as_text() {
            out.push_str(t);
            out.push(' ');
        }
    }
}
