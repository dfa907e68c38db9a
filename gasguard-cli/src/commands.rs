//! Subcommand bodies
//!
//! Commands that produce a report write to the `out` they are given so they
//! can be checked without a terminal.

use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gasguard_connectors::{server, ConsoleSink, Fanout, HttpConnector, ModelSink, Relay};
use gasguard_core::time::{SampleClock, WallClock};
use gasguard_core::{GasEstimator, HazardAssessment, HazardDimension, RawReading};
use gasguard_ml::dataset::MQ_GAS_COLUMN;
use gasguard_ml::{
    derive_thresholds, ClassificationReport, Classifier, ConfusionMatrix, Dataset, DecisionTree,
    ForestConfig, HazardModels, LabelEncoder, RandomForest, TrainConfig, TreeConfig,
};

use crate::config::Config;

/// Share of measurement rows held out for evaluation
const MEASUREMENT_TEST_FRACTION: f64 = 0.3;

fn estimator(config: &Config) -> Result<GasEstimator> {
    Ok(GasEstimator::new(config.estimator)?)
}

pub fn estimate(config: &Config, raw: u32, json: bool, out: &mut impl Write) -> Result<()> {
    let raw = RawReading::new(raw)?;
    let estimate = estimator(config)?.estimate(raw);

    if json {
        serde_json::to_writer_pretty(&mut *out, &estimate)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Sensor Reading: {}", raw)?;
    writeln!(out, "Sensor Resistance (RS): {}", estimate.resistance)?;
    writeln!(out, "Gas Type Detected: {}", estimate.gas_type)?;
    writeln!(
        out,
        "Gas Concentration ({}) in PPM: {}",
        estimate.gas_type, estimate.concentration
    )?;

    let hazard = HazardAssessment::from_raw(raw);
    for dimension in HazardDimension::ALL {
        writeln!(
            out,
            "{}: {}",
            dimension,
            dimension.level_label(hazard.level(dimension))
        )?;
    }
    Ok(())
}

pub fn curve(config: &Config, cap: f64, out: &mut impl Write) -> Result<()> {
    let estimator = estimator(config)?;

    writeln!(out, "raw,resistance_kohm,gas_type,concentration_ppm")?;
    for raw in RawReading::all() {
        let estimate = estimator.estimate(raw);
        let ppm = match estimate.concentration.ppm() {
            Some(ppm) => format!("{:.4}", ppm.min(cap)),
            None => estimate.concentration.to_string(),
        };
        writeln!(
            out,
            "{},{:.4},{},{}",
            raw,
            estimate.resistance.capped(cap),
            estimate.gas_type,
            ppm
        )?;
    }
    Ok(())
}

pub fn train(
    config: &Config,
    csv: Option<&Path>,
    forest: bool,
    trees: usize,
    output: Option<PathBuf>,
    out: &mut impl Write,
) -> Result<()> {
    if let Some(csv) = csv {
        return evaluate_measurements(csv, forest, trees, out);
    }

    let (models, report) = HazardModels::train(&Dataset::synthetic_mq2(), &TrainConfig::default())?;
    for slot in &report.slots {
        writeln!(out, "{} Model Accuracy: {:.4}", slot.slot, slot.accuracy)?;
    }

    let path = output.unwrap_or_else(|| config.models.path.clone());
    models
        .save(&path)
        .with_context(|| format!("failed to save models to {}", path.display()))?;
    writeln!(out, "Saved hazard models to {}", path.display())?;
    Ok(())
}

fn evaluate_measurements(csv: &Path, forest: bool, trees: usize, out: &mut impl Write) -> Result<()> {
    let (data, summary) = Dataset::from_csv(csv)
        .with_context(|| format!("failed to load {}", csv.display()))?;
    log::info!("loaded {} rows ({} skipped)", summary.rows, summary.skipped);

    let encoder = LabelEncoder::fit(data.labels(MQ_GAS_COLUMN)?);
    let (train, test) = data.train_test_split(MEASUREMENT_TEST_FRACTION, 42)?;

    if forest {
        let model = RandomForest::new(ForestConfig::default().with_trees(trees));
        report_classifier(model, &data, &train, &test, &encoder, out)
    } else {
        let model = DecisionTree::new(TreeConfig::default());
        report_classifier(model, &data, &train, &test, &encoder, out)
    }
}

fn report_classifier<C: Classifier>(
    mut model: C,
    all: &Dataset,
    train: &Dataset,
    test: &Dataset,
    encoder: &LabelEncoder,
    out: &mut impl Write,
) -> Result<()> {
    let targets = encoder.encode_all(train.labels(MQ_GAS_COLUMN)?)?;
    model.fit(train.features(), &targets, encoder.len())?;

    let truth = encoder.encode_all(test.labels(MQ_GAS_COLUMN)?)?;
    let predicted = model.predict_all(test.features())?;

    writeln!(out, "Classification Report:")?;
    writeln!(out, "{}", ClassificationReport::new(&truth, &predicted, encoder)?)?;
    writeln!(out, "Confusion Matrix:")?;
    write!(out, "{}", ConfusionMatrix::new(&truth, &predicted, encoder.len())?)?;

    writeln!(out, "Thresholds (95th percentile):")?;
    for (gas, threshold) in derive_thresholds(&model, all.features(), encoder)? {
        writeln!(out, "{:>16} {:.4}", gas, threshold)?;
    }
    Ok(())
}

fn load_or_train_models(path: &Path) -> Result<HazardModels> {
    if path.exists() {
        log::info!("loading hazard models from {}", path.display());
        return HazardModels::load(path)
            .with_context(|| format!("failed to load models from {}", path.display()));
    }

    log::info!("{} not found, training on the synthetic table", path.display());
    let (models, _) = HazardModels::train(&Dataset::synthetic_mq2(), &TrainConfig::default())?;
    Ok(models)
}

pub fn monitor(
    config: &Config,
    port: Option<PathBuf>,
    models: Option<PathBuf>,
    replay: bool,
) -> Result<()> {
    let models_path = models.unwrap_or_else(|| config.models.path.clone());
    let models = load_or_train_models(&models_path)?;

    let mut source = config.serial_config(port)?.open()?;
    log::info!("connected to the sensor board");

    let mut sink = Fanout::new()
        .with(ConsoleSink::stdout())
        .with(ModelSink::stdout(models));
    let estimator = estimator(config)?;
    let stats = if replay {
        Relay::new(estimator, SampleClock::default()).run(&mut source, &mut sink)?
    } else {
        Relay::new(estimator, WallClock).run(&mut source, &mut sink)?
    };

    log::info!("{} readings, {} emergencies", stats.readings, stats.emergencies);
    Ok(())
}

pub fn relay(config: &Config, port: Option<PathBuf>, url: Option<String>, quiet: bool) -> Result<()> {
    let http = HttpConnector::new(config.http_config(url))?;
    log::info!("forwarding to {}", http.url(gasguard_connectors::http::GAS_DATA_PATH));

    let mut sink = Fanout::new().with(http);
    if !quiet {
        sink = sink.with(ConsoleSink::stdout());
    }

    let mut source = config.serial_config(port)?.open()?;
    let mut relay = Relay::new(estimator(config)?, WallClock);
    let stats = relay.run(&mut source, &mut sink)?;

    if stats.sink_errors > 0 {
        log::warn!("{} of {} readings were not delivered", stats.sink_errors, stats.readings);
    }
    Ok(())
}

pub fn serve(config: &Config, addr: Option<SocketAddr>) -> Result<()> {
    let addr = addr.unwrap_or(config.server.addr);
    let estimator = estimator(config)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(addr, estimator))?;
    Ok(())
}
