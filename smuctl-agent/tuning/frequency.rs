//! Core multiplier and frequency conversions

/// Core multiplier range accepted by the overclock messages
pub const MULTI_MIN: f64 = 5.5;
pub const MULTI_MAX: f64 = 70.0;
pub const MULTI_STEP: f64 = 0.25;

/// Reference clock the multiplier applies to, in MHz
pub const BCLK_MHZ: f64 = 100.0;

/// Frequency in MHz for a core multiplier
pub fn multiplier_to_frequency(multiplier: f64) -> u32 {
    (multiplier * BCLK_MHZ).round() as u32
}

/// Every selectable multiplier, highest first
pub fn multipliers() -> Vec<f64> {
    let steps = ((MULTI_MAX - MULTI_MIN) / MULTI_STEP).round() as u32;
    (0..=steps)
        .map(|i| MULTI_MAX - i as f64 * MULTI_STEP)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_table() {
        let table = multipliers();
        assert_eq!(table.len(), 259);
        assert_eq!(table.first(), Some(&MULTI_MAX));
        assert_eq!(table.last(), Some(&MULTI_MIN));
        assert!(table.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_multiplier_to_frequency() {
        assert_eq!(multiplier_to_frequency(36.0), 3600);
        assert_eq!(multiplier_to_frequency(42.25), 4225);
        assert_eq!(multiplier_to_frequency(MULTI_MIN), 550);
    }
}
