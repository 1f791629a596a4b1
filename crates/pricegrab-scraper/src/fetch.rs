//! Single-attempt page retrieval.
//!
//! [`fetch_page`] issues exactly one GET and classifies the response; all
//! retry and identity-rotation logic lives in [`crate::retry`].

use crate::error::ScraperError;
use crate::identity::Session;

/// Statuses that marketplaces return when a request trips bot detection.
/// 430 is Shopee's non-standard "request blocked" code.
const CHALLENGE_STATUSES: [u16; 4] = [403, 429, 430, 503];

/// A successfully retrieved page body.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub body: String,
    pub status: u16,
}

/// Fetch `url` once through `session`.
///
/// Classification:
/// - 200 → `Ok(FetchedPage)`
/// - 403/429/430/503 → [`ScraperError::Challenged`]
/// - any other non-200 → [`ScraperError::UnexpectedStatus`] (surfaced to the
///   caller as `"HTTP <code>"`, never retried)
/// - DNS/connect/timeout failures → [`ScraperError::Http`]
///
/// # Errors
///
/// See classification above.
pub async fn fetch_page(session: &Session, url: &str) -> Result<FetchedPage, ScraperError> {
    let response = session.get(url).send().await?;
    let status = response.status().as_u16();

    if CHALLENGE_STATUSES.contains(&status) {
        return Err(ScraperError::Challenged {
            status,
            url: url.to_owned(),
        });
    }

    if status != 200 {
        return Err(ScraperError::UnexpectedStatus {
            status,
            url: url.to_owned(),
        });
    }

    let body = response.text().await?;
    Ok(FetchedPage { body, status })
}
