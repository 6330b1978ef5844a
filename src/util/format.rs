// Numeric formatting for console output
// (c) 2024 Ross Younger

use num_format::{Locale, ToFormattedString as _};

/// Formats a non-negative value with a fixed number of decimal places,
/// optionally grouping the integer part in thousands (`1,234,567.89`).
///
/// This mirrors the spreadsheet number formats `0.00000` and `#,##0.00`.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn fixed(value: f64, decimals: usize, thousands: bool) -> String {
    if !thousands || !value.is_finite() || value < 0. {
        return format!("{value:.decimals$}");
    }
    // Round once, at the requested precision, then split into integer and fractional parts.
    let scale = 10u64.pow(u32::try_from(decimals).unwrap_or(u32::MAX).min(9));
    let scaled = (value * scale as f64).round() as u64;
    let whole = (scaled / scale).to_formatted_string(&Locale::en);
    if decimals == 0 {
        whole
    } else {
        let frac = scaled % scale;
        format!("{whole}.{frac:0decimals$}")
    }
}
