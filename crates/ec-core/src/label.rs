//! Display transforms for tickers and fiscal periods.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::present;

/// Label used when a period cannot be expressed in quarter notation.
pub const GENERIC_PERIOD_LABEL: &str = "Results";

/// `4Q24`, possibly followed by more text.
static CANONICAL_QUARTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+Q\d{2}").unwrap());

/// `4T24`, the trimestre spelling.
static TRIMESTRE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)T(\d{2})").unwrap());

/// `2024:Q4`, the data-provider spelling.
static PROVIDER_QUARTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}(\d{2}):Q(\d)$").unwrap());

/// Shortens a provider ticker such as `PETR4 BZ Equity` to its first token.
pub fn short_ticker(provider_ticker: &str) -> &str {
    provider_ticker.split_whitespace().next().unwrap_or("")
}

/// Strips trailing digits (share-class suffix) from a ticker.
///
/// `PETR4` becomes `PETR`. A ticker made only of digits is returned as is.
pub fn display_ticker(ticker: &str) -> &str {
    let ticker = ticker.trim();
    let stripped = ticker.trim_end_matches(|c: char| c.is_ascii_digit());
    if stripped.is_empty() { ticker } else { stripped }
}

/// Normalizes a fiscal-period label to `<n>Q<yy>`.
///
/// Already-canonical labels pass through. Missing or unrecognized periods
/// become [`GENERIC_PERIOD_LABEL`].
pub fn period_label(period: Option<&str>) -> String {
    let Some(period) = present(period) else {
        return GENERIC_PERIOD_LABEL.to_string();
    };

    if CANONICAL_QUARTER_RE.is_match(period) {
        return period.to_string();
    }
    if let Some(caps) = TRIMESTRE_RE.captures(period) {
        return format!("{}Q{}", &caps[1], &caps[2]);
    }
    if let Some(caps) = PROVIDER_QUARTER_RE.captures(period) {
        return format!("{}Q{}", &caps[2], &caps[1]);
    }

    tracing::debug!(period, "period not in quarter notation");
    GENERIC_PERIOD_LABEL.to_string()
}
