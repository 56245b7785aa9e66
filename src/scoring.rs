//! Wellness and stress scoring
//!
//! Pure functions over the current vitals: a weighted 0-100 mental wellness
//! index and a categorical stress level. Both are evaluated fresh each tick
//! and carry no memory of previous values.

use crate::types::StressLevel;

/// Weighted mental wellness index in [0,100], rounded to one decimal.
///
/// Component scores: heart rate loses 1.5 points per bpm above 60, HRV earns
/// 2 points per ms above 30, steadiness maps linearly onto 0-100, and sleep
/// earns 25 points per hour above 4. Weights: 0.20 / 0.30 / 0.30 / 0.20.
pub fn wellness_index(hr: i32, hrv: i32, steadiness: f64, sleep_hours: f64) -> f64 {
    let hr_score = (100.0 - 1.5 * (hr as f64 - 60.0).max(0.0)).clamp(0.0, 100.0);
    let hrv_score = (2.0 * (hrv as f64 - 30.0)).clamp(0.0, 100.0);
    let steadiness_score = (100.0 * steadiness).clamp(0.0, 100.0);
    let sleep_score = (25.0 * (sleep_hours - 4.0)).clamp(0.0, 100.0);

    let mwi = 0.20 * hr_score + 0.30 * hrv_score + 0.30 * steadiness_score + 0.20 * sleep_score;
    ((mwi * 10.0).round() / 10.0).clamp(0.0, 100.0)
}

/// Categorical stress level from the current heart rate and HRV only
pub fn classify_stress(hr: i32, hrv: i32) -> StressLevel {
    if hr > 120 || hrv < 25 {
        StressLevel::Critical
    } else if hr > 100 || hrv < 40 {
        StressLevel::High
    } else {
        StressLevel::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(classify_stress(100, 40), StressLevel::Normal);
        assert_eq!(classify_stress(101, 40), StressLevel::High);
        assert_eq!(classify_stress(121, 25), StressLevel::Critical);
        // the HRV boundary dominates a calm heart rate
        assert_eq!(classify_stress(90, 24), StressLevel::Critical);
        assert_eq!(classify_stress(90, 39), StressLevel::High);
        assert_eq!(classify_stress(50, 100), StressLevel::Normal);
    }

    #[test]
    fn test_wellness_index_reference_point() {
        // component scores 100 / 0 / 100 / 100, weighted 20 + 0 + 30 + 20
        assert_eq!(wellness_index(60, 30, 1.0, 8.0), 70.0);
    }

    #[test]
    fn test_wellness_index_extremes() {
        assert_eq!(wellness_index(60, 80, 1.0, 8.0), 100.0);
        assert_eq!(wellness_index(160, 15, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_wellness_index_is_rounded_to_one_decimal() {
        let mwi = wellness_index(73, 52, 0.83, 6.5);
        let scaled = mwi * 10.0;
        assert!((scaled - scaled.round()).abs() < 1e-9);
    }

    #[test]
    fn test_pure_functions_are_idempotent() {
        assert_eq!(wellness_index(82, 44, 0.77, 6.2), wellness_index(82, 44, 0.77, 6.2));
        assert_eq!(classify_stress(105, 33), classify_stress(105, 33));
    }
}
