//! Price-text normalization.
//!
//! Free-form marketplace price text goes in; a canonical [`PriceRange`] and
//! a formatted [`NormalizedPrice`] come out. One ordered pattern list and one
//! plausibility window replace the per-site regex variants the marketplaces
//! otherwise accumulate: THB-tagged amounts are collected first, then
//! USD-tagged amounts, then bare numbers near a "price" keyword. Numbers
//! outside the window (SKU codes, quantity counts, pixel sizes) are
//! discarded before min/max computation.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

/// Detected currency of a [`PriceRange`].
///
/// `Other` is reserved for structured sources that declare a third currency
/// code; text extraction itself only ever detects THB or USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Thb,
    Usd,
    Other,
}

/// A canonical numeric price range. Invariant: `min <= max`, and both lie
/// inside the plausibility window of the rules that produced the range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
    pub currency: Currency,
}

/// Display string plus the THB reference value derived from a [`PriceRange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPrice {
    /// E.g. `"THB 1,200 - THB 1,500 (≈ USD 36 - USD 45)"`, collapsing to a
    /// single value when `min == max`.
    pub display: String,
    /// Always expressed in THB; converted with the static rate when the
    /// detected currency is USD, passed through unconverted for `Other`.
    pub max_thb: Decimal,
}

/// Tunables for extraction and formatting.
#[derive(Debug, Clone)]
pub struct PriceRules {
    /// Candidates at or below this value are discarded.
    pub plausible_min: Decimal,
    /// Candidates at or above this value are discarded.
    pub plausible_max: Decimal,
    /// Static THB-per-USD rate used for display conversion and `max_thb`.
    pub thb_per_usd: Decimal,
    /// Locale switch: when set, `,` is the decimal separator and `.` groups
    /// thousands. Default is comma-as-thousands.
    pub decimal_comma: bool,
}

impl Default for PriceRules {
    fn default() -> Self {
        Self {
            plausible_min: Decimal::from(10),
            plausible_max: Decimal::from(1_000_000),
            thb_per_usd: Decimal::from_str("33.5").unwrap_or(Decimal::ONE),
            decimal_comma: false,
        }
    }
}

/// Extract a [`PriceRange`] from free-form price text.
///
/// `raw` is the text carrying the candidate numbers; `context` is the wider
/// text used for currency detection (typically the visible page text). THB
/// markers anywhere in either take priority over USD markers.
///
/// Returns `None` when no plausible candidate survives — "no price found" is
/// distinct from a price of zero.
#[must_use]
pub fn extract_price_range(raw: &str, context: &str, rules: &PriceRules) -> Option<PriceRange> {
    let cleaned = raw.replace('\u{a0}', " ");

    let tiers: [&[&str]; 3] = [
        &[
            r"(?i)(?:THB|฿|Baht)\s*([0-9][0-9.,]*)",
            r"(?i)([0-9][0-9.,]*)\s*(?:THB\b|Baht\b)",
        ],
        &[
            r"(?i)(?:USD|\$)\s*([0-9][0-9.,]*)",
            r"(?i)([0-9][0-9.,]*)\s*(?:USD|Dollars?)",
        ],
        &[r"(?i)price[^0-9]{0,24}([0-9][0-9.,]*)"],
    ];

    for patterns in tiers {
        let mut candidates: Vec<Decimal> = Vec::new();
        for pattern in patterns {
            let re = Regex::new(pattern).expect("valid regex");
            for cap in re.captures_iter(&cleaned) {
                let Some(m) = cap.get(1) else { continue };
                if let Some(value) = parse_amount(m.as_str(), rules.decimal_comma) {
                    if value > rules.plausible_min && value < rules.plausible_max {
                        candidates.push(value);
                    }
                }
            }
        }
        if candidates.is_empty() {
            continue;
        }
        let min = candidates.iter().copied().min().unwrap_or(Decimal::ZERO);
        let max = candidates.iter().copied().max().unwrap_or(Decimal::ZERO);
        let currency = detect_currency(&cleaned, context);
        return Some(PriceRange { min, max, currency });
    }

    None
}

/// Parse one matched amount string to a decimal.
///
/// Default convention treats `,` as a thousands separator; `decimal_comma`
/// flips to the `1.234,50` convention. Strings that stay malformed after
/// separator cleanup (e.g. `1.2.3`) are rejected.
fn parse_amount(s: &str, decimal_comma: bool) -> Option<Decimal> {
    let trimmed = s.trim_matches(|c| c == '.' || c == ',');
    if trimmed.is_empty() {
        return None;
    }
    let cleaned = if decimal_comma {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.replace(',', "")
    };
    Decimal::from_str(&cleaned).ok()
}

/// THB markers anywhere in the price or context text win; otherwise USD.
fn detect_currency(raw: &str, context: &str) -> Currency {
    let re = Regex::new(r"(?i)฿|\bTHB\b|\bbaht\b").expect("valid regex");
    if re.is_match(raw) || re.is_match(context) {
        Currency::Thb
    } else {
        Currency::Usd
    }
}

impl NormalizedPrice {
    /// Render the display string and compute the THB reference value.
    #[must_use]
    pub fn from_range(range: &PriceRange, rules: &PriceRules) -> Self {
        let rate = rules.thb_per_usd;
        match range.currency {
            Currency::Thb => {
                let display = format_pair(
                    "THB",
                    range.min,
                    range.max,
                    Some(("USD", range.min / rate, range.max / rate)),
                );
                Self {
                    display,
                    max_thb: round_whole(range.max),
                }
            }
            Currency::Usd => {
                let display = format_pair(
                    "USD",
                    range.min,
                    range.max,
                    Some(("THB", range.min * rate, range.max * rate)),
                );
                Self {
                    display,
                    max_thb: round_whole(range.max * rate),
                }
            }
            Currency::Other => {
                let display = if range.min == range.max {
                    format_amount(range.max)
                } else {
                    format!("{} - {}", format_amount(range.min), format_amount(range.max))
                };
                Self {
                    display,
                    max_thb: round_whole(range.max),
                }
            }
        }
    }
}

/// `"<CUR> <min> - <CUR> <max> (≈ <other> ...)"`, collapsing to a single
/// value when the range is degenerate.
fn format_pair(
    code: &str,
    min: Decimal,
    max: Decimal,
    equivalent: Option<(&str, Decimal, Decimal)>,
) -> String {
    let mut out = if min == max {
        format!("{code} {}", format_amount(max))
    } else {
        format!(
            "{code} {} - {code} {}",
            format_amount(min),
            format_amount(max)
        )
    };
    if let Some((eq_code, eq_min, eq_max)) = equivalent {
        if min == max {
            out.push_str(&format!(" (≈ {eq_code} {})", format_amount(eq_max)));
        } else {
            out.push_str(&format!(
                " (≈ {eq_code} {} - {eq_code} {})",
                format_amount(eq_min),
                format_amount(eq_max)
            ));
        }
    }
    out
}

fn round_whole(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Whole-unit rendering with thousands grouping, e.g. `1500 -> "1,500"`.
fn format_amount(value: Decimal) -> String {
    let digits = round_whole(value).to_string();
    let (sign, magnitude) = digits
        .strip_prefix('-')
        .map_or(("", digits.as_str()), |rest| ("-", rest));

    let mut grouped = String::with_capacity(magnitude.len() + magnitude.len() / 3);
    for (i, c) in magnitude.chars().enumerate() {
        if i > 0 && (magnitude.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}")
}

#[cfg(test)]
#[path = "price_test.rs"]
mod tests;
