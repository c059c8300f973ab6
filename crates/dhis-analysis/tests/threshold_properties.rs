//! Property tests for performance threshold clamping.

use proptest::prelude::*;

use dhis_analysis::Thresholds;

proptest! {
    #[test]
    fn clamped_thresholds_are_strictly_increasing(
        low in -10_000i32..10_000,
        mid in -10_000i32..10_000,
        high in -10_000i32..10_000,
    ) {
        let clamped = Thresholds::new(low, mid, high).clamped();
        prop_assert!(clamped.low < clamped.mid);
        prop_assert!(clamped.mid < clamped.high);
    }

    #[test]
    fn extreme_thresholds_stay_strictly_increasing(low: i32, mid: i32, high: i32) {
        let clamped = Thresholds::new(low, mid, high).clamped();
        prop_assert!(clamped.low < clamped.mid);
        prop_assert!(clamped.mid < clamped.high);
        prop_assert!((-1..=101).contains(&clamped.low));
        prop_assert!((-1..=101).contains(&clamped.high));
        prop_assert_eq!(clamped.clamped(), clamped);
    }

    #[test]
    fn clamping_is_idempotent(
        low in -10_000i32..10_000,
        mid in -10_000i32..10_000,
        high in -10_000i32..10_000,
    ) {
        let once = Thresholds::new(low, mid, high).clamped();
        prop_assert_eq!(once.clamped(), once);
    }

    #[test]
    fn valid_triples_are_left_alone(low in 1i32..30, gap_mid in 1i32..30, gap_high in 1i32..30) {
        let thresholds = Thresholds::new(low, low + gap_mid, low + gap_mid + gap_high);
        prop_assert_eq!(thresholds.clamped(), thresholds);
        prop_assert!(thresholds.is_valid_binning());
    }
}
