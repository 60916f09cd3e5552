//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a player count to f32 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f32(value: u32) -> f32 {
    cast::<u32, f32>(value).unwrap_or(0.0)
}

/// Convert a collection length to f32 for averages.
#[must_use]
pub fn len_to_f32(value: usize) -> f32 {
    cast::<usize, f32>(value).unwrap_or(0.0)
}

/// Truncate a f32 toward zero and clamp it to the i64 range, returning 0 for non-finite values.
///
/// Report point totals are displayed as whole numbers by dropping the fraction.
#[must_use]
pub fn truncate_f32_to_i64(value: f32) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f32>(i64::MIN).unwrap_or(f32::MIN);
    let max = cast::<i64, f32>(i64::MAX).unwrap_or(f32::MAX);
    let clamped = value.clamp(min, max).trunc();
    cast::<f32, i64>(clamped).unwrap_or(0)
}

/// Clamp a budget value to be finite and non-negative.
#[must_use]
pub fn sanitize_budget(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
