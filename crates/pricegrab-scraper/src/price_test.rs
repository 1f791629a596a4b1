use rust_decimal::Decimal;

use super::*;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn rules() -> PriceRules {
    PriceRules::default()
}

// ---------------------------------------------------------------------------
// Candidate collection and the plausibility window
// ---------------------------------------------------------------------------

#[test]
fn sku_codes_yield_no_price() {
    assert_eq!(extract_price_range("SKU 12345678", "", &rules()), None);
}

#[test]
fn out_of_window_numbers_are_discarded() {
    // 12,345,678 is currency-tagged but far outside the window.
    assert_eq!(extract_price_range("THB 12,345,678", "", &rules()), None);
    // At-or-below the lower bound is discarded too.
    assert_eq!(extract_price_range("THB 10", "", &rules()), None);
}

#[test]
fn empty_text_yields_no_price() {
    assert_eq!(extract_price_range("", "", &rules()), None);
}

#[test]
fn comma_is_thousands_separator_by_default() {
    let range = extract_price_range("THB 1,234", "", &rules()).unwrap();
    assert_eq!(range.min, dec("1234"));
    assert_eq!(range.max, dec("1234"));
}

#[test]
fn decimal_comma_locale_flips_separators() {
    let mut r = rules();
    r.decimal_comma = true;
    let range = extract_price_range("THB 1.234,50", "", &r).unwrap();
    assert_eq!(range.min, dec("1234.50"));
}

#[test]
fn malformed_numbers_are_rejected() {
    // "1.2.3" survives no separator interpretation.
    assert_eq!(extract_price_range("USD 1.2.3.4", "", &rules()), None);
}

#[test]
fn non_breaking_spaces_are_stripped() {
    let range = extract_price_range("THB\u{a0}350", "", &rules()).unwrap();
    assert_eq!(range.max, dec("350"));
}

// ---------------------------------------------------------------------------
// Tier priority and currency detection
// ---------------------------------------------------------------------------

#[test]
fn thb_tagged_amounts_outrank_usd_tagged() {
    // Both markers present: the THB tier wins the candidates AND the
    // detected currency is THB.
    let range = extract_price_range("USD 10 ฿350", "", &rules()).unwrap();
    assert_eq!(range.currency, Currency::Thb);
    assert_eq!(range.min, dec("350"));
    assert_eq!(range.max, dec("350"));
}

#[test]
fn usd_tier_applies_when_no_thb_amounts() {
    let range = extract_price_range("$ 25.50", "", &rules()).unwrap();
    assert_eq!(range.currency, Currency::Usd);
    assert_eq!(range.min, dec("25.50"));
}

#[test]
fn keyword_tier_catches_bare_numbers() {
    let range = extract_price_range("Special price: 199", "", &rules()).unwrap();
    assert_eq!(range.currency, Currency::Usd);
    assert_eq!(range.min, dec("199"));
}

#[test]
fn thb_marker_in_context_overrides_usd_default() {
    // Candidates come from the keyword tier; the surrounding page text
    // carries a baht sign.
    let range = extract_price_range("price 450", "ราคา ฿", &rules()).unwrap();
    assert_eq!(range.currency, Currency::Thb);
}

#[test]
fn ranges_span_min_and_max() {
    let range = extract_price_range("THB 1,200 - THB 1,500", "", &rules()).unwrap();
    assert_eq!(range.min, dec("1200"));
    assert_eq!(range.max, dec("1500"));
    assert_eq!(range.currency, Currency::Thb);
}

// ---------------------------------------------------------------------------
// Display formatting and the THB reference value
// ---------------------------------------------------------------------------

#[test]
fn thb_range_display_includes_usd_equivalent() {
    let range = extract_price_range("THB 1,200 - THB 1,500", "", &rules()).unwrap();
    let price = NormalizedPrice::from_range(&range, &rules());
    assert_eq!(price.display, "THB 1,200 - THB 1,500 (≈ USD 36 - USD 45)");
    assert_eq!(price.max_thb, dec("1500"));
}

#[test]
fn degenerate_range_collapses_to_single_value() {
    let range = PriceRange {
        min: dec("100"),
        max: dec("100"),
        currency: Currency::Usd,
    };
    let price = NormalizedPrice::from_range(&range, &rules());
    assert_eq!(price.display, "USD 100 (≈ THB 3,350)");
    assert_eq!(price.max_thb, dec("3350"));
}

#[test]
fn usd_range_reference_value_is_converted_to_thb() {
    let range = PriceRange {
        min: dec("100"),
        max: dec("200"),
        currency: Currency::Usd,
    };
    let price = NormalizedPrice::from_range(&range, &rules());
    assert_eq!(price.display, "USD 100 - USD 200 (≈ THB 3,350 - THB 6,700)");
    assert_eq!(price.max_thb, dec("6700"));
}

#[test]
fn other_currency_skips_conversion() {
    let range = PriceRange {
        min: dec("500"),
        max: dec("900"),
        currency: Currency::Other,
    };
    let price = NormalizedPrice::from_range(&range, &rules());
    assert_eq!(price.display, "500 - 900");
    assert_eq!(price.max_thb, dec("900"));
}

#[test]
fn amounts_round_to_whole_units_in_display() {
    let range = PriceRange {
        min: dec("25.50"),
        max: dec("25.50"),
        currency: Currency::Usd,
    };
    let price = NormalizedPrice::from_range(&range, &rules());
    // 25.50 -> 26; 25.50 * 33.5 = 854.25 -> 854
    assert_eq!(price.display, "USD 26 (≈ THB 854)");
}

#[test]
fn grouping_inserts_thousands_commas() {
    assert_eq!(format_amount(dec("1500")), "1,500");
    assert_eq!(format_amount(dec("999")), "999");
    assert_eq!(format_amount(dec("1234567")), "1,234,567");
}
