//! Property tests for the estimator over the full raw range

mod common;

use gasguard_core::{
    concentration, BandClassifier, Concentration, EstimatorConfig, GasClassifier, GasEstimator,
    GasType, ProfileCatalog, RawReading, Resistance, ResistanceConverter,
};
use proptest::prelude::*;

use common::{assert_close, BAND_ENTRY_RAW};

proptest! {
    #[test]
    fn every_reading_yields_one_calibrated_gas(raw in 0u32..=1023) {
        let estimate = GasEstimator::default().estimate(RawReading::new(raw).unwrap());
        prop_assert!(GasType::CALIBRATED.contains(&estimate.gas_type));
        prop_assert!(!matches!(estimate.concentration, Concentration::Unavailable));
    }

    #[test]
    fn resistance_decreases_as_reading_rises(a in 1u32..1023, b in 1u32..1023) {
        prop_assume!(a < b);
        let converter = ResistanceConverter::default();
        let low = converter.convert(RawReading::new(a).unwrap());
        let high = converter.convert(RawReading::new(b).unwrap());
        prop_assert!(low > high);
    }

    #[test]
    fn resistance_is_independent_of_supply(raw in 1u32..=1023, supply in 0.5f64..48.0) {
        let config = EstimatorConfig::new(supply, 0.4388).unwrap();
        let converter = ResistanceConverter::new(&config);
        let rs = converter.convert(RawReading::new(raw).unwrap()).finite().unwrap();
        let expected = (1023.0 - raw as f64) / raw as f64;
        prop_assert!((rs - expected).abs() < 1e-9 * expected.max(1.0));
    }

    #[test]
    fn concentration_falls_as_resistance_rises(rs_a in 0.01f64..100.0, rs_b in 0.01f64..100.0) {
        prop_assume!(rs_a < rs_b);
        for profile in ProfileCatalog::mq2().iter() {
            let a = concentration::estimate_ppm(Resistance::Finite(rs_a), 0.4388, profile).unwrap();
            let b = concentration::estimate_ppm(Resistance::Finite(rs_b), 0.4388, profile).unwrap();
            prop_assert!(a > b, "{}: {} !> {}", profile.gas, a, b);
        }
    }

    #[test]
    fn classification_is_ordered_by_band(rs in 0.0f64..100.0) {
        let gas = BandClassifier::mq2().classify(Resistance::Finite(rs));
        let index = GasType::CALIBRATED.iter().position(|g| *g == gas).unwrap();
        let lower = [0.0, 1.0, 5.0, 10.0, 20.0, 30.0][index];
        prop_assert!(rs >= lower);
    }
}

#[test]
fn band_entry_points() {
    let estimator = GasEstimator::default();
    for (raw, label) in BAND_ENTRY_RAW {
        let estimate = estimator.estimate(RawReading::new(raw as u32).unwrap());
        assert_eq!(estimate.gas_type.name(), label, "raw {}", raw);
    }

    // one count lower moves to the next band up in resistance
    assert_eq!(estimator.estimate(RawReading::new(511).unwrap()).gas_type, GasType::Co);
    assert_eq!(estimator.estimate(RawReading::new(170).unwrap()).gas_type, GasType::Methane);
}

#[test]
fn exact_band_edges_go_up() {
    let classifier = BandClassifier::mq2();
    let cases = [
        (1.0, GasType::Co),
        (5.0, GasType::Methane),
        (10.0, GasType::Smoke),
        (20.0, GasType::Butane),
        (30.0, GasType::Alcohol),
    ];
    for (rs, gas) in cases {
        assert_eq!(classifier.classify(Resistance::Finite(rs)), gas, "RS {}", rs);
    }
}

#[test]
fn worked_example_at_mid_scale() {
    let estimator = GasEstimator::default();
    let raw = RawReading::new(500).unwrap();

    let converter = ResistanceConverter::default();
    assert_close(converter.output_voltage(raw), 5.8651, 1e-4);

    let estimate = estimator.estimate(raw);
    assert_eq!(estimate.gas_type, GasType::Co);
    assert_close(estimate.resistance.finite().unwrap(), 1.046, 1e-9);
    assert_close(estimate.concentration.ppm().unwrap(), 408.33, 0.01);
}

#[test]
fn sentinels_serialize_as_strings() {
    let estimator = GasEstimator::default();

    let zero = serde_json::to_value(estimator.estimate(RawReading::new(0).unwrap())).unwrap();
    assert_eq!(zero["gas_type"], "Alcohol");
    assert_eq!(zero["resistance_kohm"], "unbounded");
    assert_eq!(zero["concentration_ppm"], 0.0);

    let full = serde_json::to_value(estimator.estimate(RawReading::new(1023).unwrap())).unwrap();
    assert_eq!(full["gas_type"], "LPG");
    assert_eq!(full["resistance_kohm"], 0.0);
    assert_eq!(full["concentration_ppm"], "invalid");
}

#[test]
fn estimator_is_stateless() {
    let estimator = GasEstimator::default();
    let raw = RawReading::new(250).unwrap();
    let first = estimator.estimate(raw);
    estimator.estimate(RawReading::new(0).unwrap());
    estimator.estimate(RawReading::new(1023).unwrap());
    assert_eq!(estimator.estimate(raw), first);
}
