//! The `collect` run: a strictly sequential loop over the URL rows.
//!
//! One in-flight request at a time — concurrent requests from the same
//! identity sharply increase bot-detection risk. Each row's failures stay
//! local to that row; the results file always contains one entry per
//! processed row.

use std::path::PathBuf;

use serde::Serialize;

use pricegrab_core::AppConfig;
use pricegrab_scraper::{
    process_url, ListingReport, NoApiCapture, Pacing, PipelineOptions, PriceRules,
};

/// One line of the results file: the report plus the human label from the
/// rows file.
#[derive(Debug, Serialize)]
struct RowResult {
    label: Option<String>,
    #[serde(flatten)]
    report: ListingReport,
}

fn pipeline_options(config: &AppConfig) -> PipelineOptions {
    PipelineOptions {
        request_timeout_secs: config.request_timeout_secs,
        max_attempts: config.max_attempts,
        retry_backoff_base_secs: config.retry_backoff_base_secs,
        rules: PriceRules {
            plausible_min: config.plausible_min,
            plausible_max: config.plausible_max,
            thb_per_usd: config.thb_per_usd,
            decimal_comma: false,
        },
    }
}

fn pacing(config: &AppConfig, no_pacing: bool) -> Pacing {
    Pacing {
        between_ms: config.delay_between_rows_ms,
        cooldown_every: config.cooldown_every_n_rows,
        cooldown_ms: config.cooldown_ms,
        enabled: config.pacing_enabled && !no_pacing,
    }
}

pub(crate) async fn run(
    config: &AppConfig,
    rows_override: Option<PathBuf>,
    out_override: Option<PathBuf>,
    limit: Option<usize>,
    no_pacing: bool,
) -> anyhow::Result<()> {
    let rows_path = rows_override.unwrap_or_else(|| config.rows_path.clone());
    let out_path = out_override.unwrap_or_else(|| config.output_path.clone());

    let rows_file = pricegrab_core::load_rows(&rows_path)?;
    let rows: Vec<_> = match limit {
        Some(n) => rows_file.rows.into_iter().take(n).collect(),
        None => rows_file.rows,
    };
    tracing::info!(total = rows.len(), rows_path = %rows_path.display(), "starting collect run");

    let opts = pipeline_options(config);
    let pacing = pacing(config, no_pacing);
    let capture = NoApiCapture;

    let mut results: Vec<RowResult> = Vec::with_capacity(rows.len());
    let mut processed = 0usize;
    let mut priced = 0usize;

    for (index, row) in rows.iter().enumerate() {
        let Some(url) = row.url() else {
            tracing::debug!(row = index + 1, "row has no URL — skipped");
            continue;
        };

        tracing::info!(row = index + 1, url, "processing row");
        let report = process_url(&opts, url, &capture).await;
        tracing::info!(
            row = index + 1,
            title = %report.title,
            price = %report.price_display,
            "row done"
        );

        if report.max_thb.is_some() {
            priced += 1;
        }
        results.push(RowResult {
            label: row.label.clone(),
            report,
        });

        processed += 1;
        pacing.rest_after(processed).await;
    }

    let json = serde_json::to_string_pretty(&results)?;
    std::fs::write(&out_path, json)?;
    tracing::info!(
        processed,
        priced,
        out_path = %out_path.display(),
        "collect run finished"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        pricegrab_core::load_app_config_from_env().unwrap()
    }

    #[test]
    fn pipeline_options_carry_the_configured_window_and_rate() {
        let opts = pipeline_options(&config());
        assert_eq!(opts.rules.thb_per_usd.to_string(), "33.5");
        assert_eq!(opts.rules.plausible_min.to_string(), "10");
        assert_eq!(opts.max_attempts, 3);
    }

    #[test]
    fn no_pacing_flag_overrides_the_config() {
        let p = pacing(&config(), true);
        assert!(!p.enabled);
    }

    #[test]
    fn row_results_flatten_the_report() {
        let result = RowResult {
            label: Some("widget".to_owned()),
            report: ListingReport {
                url: "https://example.com/x".to_owned(),
                title: "Widget".to_owned(),
                image: "No image found".to_owned(),
                price_display: "No price found".to_owned(),
                max_thb: None,
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["label"], "widget");
        assert_eq!(json["title"], "Widget");
        assert_eq!(json["url"], "https://example.com/x");
    }
}
