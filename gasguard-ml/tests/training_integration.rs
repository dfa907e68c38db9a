//! Training, evaluation and persistence end to end

use std::io::Write;

use gasguard_core::RawReading;
use gasguard_ml::{
    derive_thresholds, Classifier, ClassificationReport, Dataset, ForestConfig, HazardModels,
    LabelEncoder, MlError, ModelSlot, RandomForest, TrainConfig,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// MQ measurement CSV with three gases, each raising a different sensor subset
fn write_measurements(rows_per_gas: usize) -> tempfile::NamedTempFile {
    let mut rng = StdRng::seed_from_u64(11);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "Serial Number,MQ2,MQ3,MQ5,MQ6,MQ7,MQ8,MQ135,Gas").unwrap();

    let profiles: [(&str, [f64; 7]); 3] = [
        ("NoGas", [550.0, 510.0, 380.0, 340.0, 660.0, 450.0, 420.0]),
        ("Mixture_Smoke", [760.0, 640.0, 520.0, 470.0, 710.0, 580.0, 590.0]),
        ("Mixture_Perfume", [600.0, 780.0, 400.0, 360.0, 690.0, 470.0, 700.0]),
    ];

    let mut serial = 0;
    for (gas, centers) in profiles {
        for _ in 0..rows_per_gas {
            let values: Vec<String> = centers
                .iter()
                .map(|c| format!("{:.0}", c + rng.gen_range(-25.0..25.0)))
                .collect();
            writeln!(file, "{},{},{}", serial, values.join(","), gas).unwrap();
            serial += 1;
        }
    }
    writeln!(file, "{},oops,1,2,3,4,5,6,NoGas", serial).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn forest_on_measurement_table() {
    let file = write_measurements(60);
    let (data, summary) = Dataset::from_csv(file.path()).unwrap();
    assert_eq!(summary.rows, 180);
    assert_eq!(summary.skipped, 1);

    let (train, test) = data.train_test_split(0.3, 42).unwrap();
    let encoder = LabelEncoder::fit(data.labels("Gas").unwrap());
    assert_eq!(encoder.classes(), &["NoGas", "Perfume", "Smoke"]);

    let mut forest = RandomForest::new(ForestConfig::default().with_trees(25));
    forest
        .fit(
            train.features(),
            &encoder.encode_all(train.labels("Gas").unwrap()).unwrap(),
            encoder.len(),
        )
        .unwrap();

    let truth = encoder.encode_all(test.labels("Gas").unwrap()).unwrap();
    let predicted = forest.predict_all(test.features()).unwrap();
    let report = ClassificationReport::new(&truth, &predicted, &encoder).unwrap();
    assert!(report.accuracy > 0.9, "{}", report);

    let thresholds = derive_thresholds(&forest, data.features(), &encoder).unwrap();
    assert_eq!(thresholds.len(), 3);
    for (gas, threshold) in thresholds {
        assert!(threshold > 0.5 && threshold <= 1.0, "{}: {}", gas, threshold);
    }
}

#[test]
fn hazard_models_survive_a_round_trip_to_disk() {
    let (models, _) = HazardModels::train(&Dataset::synthetic_mq2(), &TrainConfig::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hazard_models.json");
    models.save(&path).unwrap();
    let loaded = HazardModels::load(&path).unwrap();

    assert_eq!(loaded, models);
    for raw in [0u32, 149, 150, 499, 500, 1023] {
        let raw = RawReading::new(raw).unwrap();
        assert_eq!(loaded.predict_reading(raw).unwrap(), models.predict_reading(raw).unwrap());
    }
}

#[test]
fn every_slot_has_a_report() {
    let (_, report) = HazardModels::train(&Dataset::synthetic_mq2(), &TrainConfig::default()).unwrap();
    for slot in ModelSlot::ALL {
        let slot_report = report.slots.iter().find(|s| s.slot == slot).unwrap();
        assert_eq!(slot_report.report.classes.len(), 3, "{}", slot);
    }
}

#[test]
fn hand_edited_model_with_a_cycle_is_rejected() {
    let (models, _) = HazardModels::train(&Dataset::synthetic_mq2(), &TrainConfig::default()).unwrap();
    let mut json = serde_json::to_value(&models).unwrap();
    json["fire_risk"]["tree"]["nodes"][0] = serde_json::json!({
        "Split": {"feature": 0, "threshold": 150.0, "left": 0, "right": 0}
    });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hazard_models.json");
    std::fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

    assert!(matches!(HazardModels::load(&path), Err(MlError::CorruptModel(_))));
}

#[test]
fn loading_garbage_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "not json").unwrap();
    assert!(HazardModels::load(file.path()).is_err());
}
