//! Per-URL orchestration: route → fetch (retry-wrapped) → extract →
//! normalize.
//!
//! Every URL yields a well-formed [`ListingReport`]; failures are folded
//! into the documented sentinel strings and never abort the surrounding run.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ScraperError;
use crate::extract::{self, shopee, ItemApiCapture, ListingFields};
use crate::identity::Session;
use crate::price::{NormalizedPrice, PriceRules};
use crate::retry::fetch_with_retry;
use crate::router::{route, ExtractorKind};

pub const NO_TITLE: &str = "No title";
pub const NO_IMAGE: &str = "No image found";
pub const NO_PRICE: &str = "No price found";
pub const ERROR_AFTER_RETRIES: &str = "Error after retries";
pub const INVALID_URL: &str = "Invalid URL";

/// The tuple handed back to the external writer for one row.
#[derive(Debug, Clone, Serialize)]
pub struct ListingReport {
    pub url: String,
    pub title: String,
    pub image: String,
    pub price_display: String,
    /// Reference value in THB; `None` mirrors the "No price found" display.
    pub max_thb: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub request_timeout_secs: u64,
    /// Total fetch attempts per URL, including the first.
    pub max_attempts: u32,
    pub retry_backoff_base_secs: u64,
    pub rules: PriceRules,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            request_timeout_secs: 40,
            max_attempts: 3,
            retry_backoff_base_secs: 5,
            rules: PriceRules::default(),
        }
    }
}

/// Process one product URL end to end.
///
/// This function does not fail: transport errors, challenges, and missing
/// data all come back as sentinel-filled reports.
pub async fn process_url(
    opts: &PipelineOptions,
    url: &str,
    capture: &dyn ItemApiCapture,
) -> ListingReport {
    if let Err(err) = validate_url(url) {
        tracing::debug!(url, error = %err, "skipping row without a fetch");
        return report_from_error(url, &err);
    }

    let result = match route(url) {
        ExtractorKind::Shopee => process_shopee(opts, url, capture).await,
        kind => fetch_and_extract(opts, url, kind).await,
    };

    match result {
        Ok(fields) => report_from_fields(url, fields, &opts.rules),
        Err(err) => {
            tracing::warn!(url, error = %err, "listing could not be retrieved");
            report_from_error(url, &err)
        }
    }
}

fn validate_url(url: &str) -> Result<(), ScraperError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        });
    }
    Ok(())
}

async fn fetch_and_extract(
    opts: &PipelineOptions,
    url: &str,
    kind: ExtractorKind,
) -> Result<ListingFields, ScraperError> {
    let page = fetch_with_retry(url, opts.max_attempts, opts.retry_backoff_base_secs, || {
        Session::new(opts.request_timeout_secs)
    })
    .await?;
    Ok(extract::extract_listing(kind, &page.body, &opts.rules))
}

/// The Shopee acquisition chain: captured API payload, then the fetched
/// page's `__NEXT_DATA__`, then plain HTML scraping. Non-item URLs go
/// straight to the generic chain.
async fn process_shopee(
    opts: &PipelineOptions,
    url: &str,
    capture: &dyn ItemApiCapture,
) -> Result<ListingFields, ScraperError> {
    let Some(item) = shopee::parse_item_ref(url) else {
        tracing::debug!(url, "shopee URL without an item pattern — using generic chain");
        return fetch_and_extract(opts, url, ExtractorKind::Generic).await;
    };

    if let Some(payload) = capture.capture_item_payload(url).await {
        if let Some(fields) = shopee::extract_from_api_payload(&payload, &opts.rules) {
            return Ok(fields);
        }
        tracing::debug!(
            shop_id = item.shop_id,
            item_id = item.item_id,
            "captured payload unusable — falling back to page fetch"
        );
    }

    let page = fetch_with_retry(url, opts.max_attempts, opts.retry_backoff_base_secs, || {
        Session::new(opts.request_timeout_secs)
    })
    .await?;
    Ok(extract::extract_shopee_page(&page.body, &opts.rules))
}

fn report_from_fields(url: &str, fields: ListingFields, rules: &PriceRules) -> ListingReport {
    let (price_display, max_thb) = match fields.price {
        Some(range) => {
            let normalized = NormalizedPrice::from_range(&range, rules);
            (normalized.display, Some(normalized.max_thb))
        }
        None => (NO_PRICE.to_owned(), None),
    };

    ListingReport {
        url: url.to_owned(),
        title: fields.title.unwrap_or_else(|| NO_TITLE.to_owned()),
        image: fields
            .image
            .filter(|i| i.starts_with("http"))
            .unwrap_or_else(|| NO_IMAGE.to_owned()),
        price_display,
        max_thb,
    }
}

fn report_from_error(url: &str, err: &ScraperError) -> ListingReport {
    let price_display = match err {
        ScraperError::UnexpectedStatus { status, .. } => format!("HTTP {status}"),
        ScraperError::InvalidUrl { .. } => INVALID_URL.to_owned(),
        ScraperError::Challenged { .. } | ScraperError::Http(_) => {
            ERROR_AFTER_RETRIES.to_owned()
        }
    };
    ListingReport {
        url: url.to_owned(),
        title: NO_TITLE.to_owned(),
        image: NO_IMAGE.to_owned(),
        price_display,
        max_thb: None,
    }
}
