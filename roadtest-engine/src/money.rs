//! Integer-cents helpers centralizing the float boundary.
//!
//! Distances arrive as real kilometers, so per-km charges are computed once in
//! `f64` and rounded to whole cents here. Everything downstream sums `i64`.

use num_traits::cast::cast;

/// Multiply a kilometer count by a per-km rate and round to whole cents.
///
/// Returns 0 for non-finite input; callers validate distances before pricing.
#[must_use]
pub fn km_charge_cents(km: f64, rate_cents: i64) -> i64 {
    round_f64_to_i64(km * i64_to_f64(rate_cents))
}

/// Round a f64 half away from zero and clamp it to the i64 range, returning 0
/// for non-finite values.
#[must_use]
pub fn round_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i64>(clamped).unwrap_or(0)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Format cents as a dollar amount with two decimals, e.g. `16500` → `"165.00"`.
#[must_use]
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Format cents with a leading dollar sign, e.g. `4000` → `"$40.00"`.
#[must_use]
pub fn format_dollars(cents: i64) -> String {
    let formatted = format_cents(cents);
    formatted.strip_prefix('-').map_or_else(
        || format!("${formatted}"),
        |unsigned| format!("-${unsigned}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn km_charge_rounds_to_cents() {
        assert_eq!(km_charge_cents(50.0, 100), 5_000);
        assert_eq!(km_charge_cents(70.0, 50), 3_500);
        assert_eq!(km_charge_cents(0.333, 100), 33);
        assert_eq!(km_charge_cents(f64::NAN, 100), 0);
    }

    #[test]
    fn rounding_clamps_and_handles_non_finite() {
        assert_eq!(round_f64_to_i64(1.5), 2);
        assert_eq!(round_f64_to_i64(-1.5), -2);
        assert_eq!(round_f64_to_i64(f64::INFINITY), 0);
        assert_eq!(round_f64_to_i64(84.999_9), 85);
    }

    #[test]
    fn formats_two_decimals() {
        assert_eq!(format_cents(16_500), "165.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-250), "-2.50");
        assert_eq!(format_dollars(4_000), "$40.00");
        assert_eq!(format_dollars(-99), "-$0.99");
    }
}
