pub mod error;
pub mod extract;
pub mod fetch;
pub mod identity;
pub mod pacing;
pub mod pipeline;
pub mod price;
pub mod retry;
pub mod router;

pub use error::ScraperError;
pub use extract::{InterceptedCapture, ItemApiCapture, ListingFields, NoApiCapture};
pub use fetch::{fetch_page, FetchedPage};
pub use identity::{BrowserIdentity, Session};
pub use pacing::Pacing;
pub use pipeline::{process_url, ListingReport, PipelineOptions};
pub use price::{extract_price_range, Currency, NormalizedPrice, PriceRange, PriceRules};
pub use retry::fetch_with_retry;
pub use router::{route, ExtractorKind};
