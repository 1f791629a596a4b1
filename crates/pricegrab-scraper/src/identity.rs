//! Rotating browser-like identities and the per-run HTTP session.
//!
//! Marketplace anti-bot stacks fingerprint repeat clients, so every session
//! carries a user-agent, accept-language, and referer drawn from small
//! rotation pools. A [`Session`] is recreated with a fresh identity only when
//! a challenge response is detected — never shared as hidden process-wide
//! state.

use std::time::Duration;

use rand::seq::IndexedRandom;

use crate::error::ScraperError;

const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_3) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.3 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122 Safari/537.36",
];

const ACCEPT_LANGUAGES: [&str; 3] = [
    "en-US,en;q=0.9",
    "th-TH,th;q=0.9,en;q=0.8",
    "en-GB,en;q=0.9",
];

const REFERERS: [&str; 3] = [
    "https://google.com/",
    "https://www.alibaba.com/",
    "https://bing.com/",
];

/// One browser-like header set, sampled from the rotation pools.
#[derive(Debug, Clone)]
pub struct BrowserIdentity {
    pub user_agent: &'static str,
    pub accept_language: &'static str,
    pub referer: &'static str,
}

impl BrowserIdentity {
    /// Sample a fresh identity. Selection is read-only over the pools; there
    /// is no cross-request contention.
    #[must_use]
    pub fn sample() -> Self {
        let mut rng = rand::rng();
        Self {
            user_agent: USER_AGENTS.choose(&mut rng).copied().unwrap_or(USER_AGENTS[0]),
            accept_language: ACCEPT_LANGUAGES
                .choose(&mut rng)
                .copied()
                .unwrap_or(ACCEPT_LANGUAGES[0]),
            referer: REFERERS.choose(&mut rng).copied().unwrap_or(REFERERS[0]),
        }
    }
}

/// An HTTP client bound to one [`BrowserIdentity`].
///
/// The underlying `reqwest::Client` carries the request timeout; the identity
/// headers are applied to every GET issued through [`Session::get`].
pub struct Session {
    client: reqwest::Client,
    identity: BrowserIdentity,
}

impl Session {
    /// Create a session with a freshly sampled identity.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64) -> Result<Self, ScraperError> {
        Self::with_identity(timeout_secs, BrowserIdentity::sample())
    }

    /// Create a session with an explicit identity.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_identity(
        timeout_secs: u64,
        identity: BrowserIdentity,
    ) -> Result<Self, ScraperError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, identity })
    }

    #[must_use]
    pub fn identity(&self) -> &BrowserIdentity {
        &self.identity
    }

    /// Build a GET request carrying the session's browser-like headers.
    pub(crate) fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header(reqwest::header::USER_AGENT, self.identity.user_agent)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, self.identity.accept_language)
            .header(reqwest::header::REFERER, self.identity.referer)
            .header(reqwest::header::CONNECTION, "keep-alive")
    }
}
