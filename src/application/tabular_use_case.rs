// ============================================================
// Layer 2 — TabularUseCase (Pipeline B)
// ============================================================
//   Step 1: Load customer rows          (Layer 4 - data)
//   Step 2: Fit encoders + transform    (Layer 4 - data)
//   Step 3: Build the propensity model  (Layer 5 - ml)
//   Step 4: Train                       (Layer 5 - ml)
//   Step 5: Score every row             (Layer 5 - ml)

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::{AutodiffModule, Module},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::application::RunReport;
use crate::data::{
    records::{BundledCustomers, JsonRecordFile},
    tabular_batcher::TabularBatcher,
    tabular_dataset::TabularDataset,
    tabular_encoder::TabularEncoder,
};
use crate::domain::{
    error::PipelineError,
    record::{TabularRow, TabularSchema},
    traits::RecordSource,
};
use crate::infra::metrics::MetricsLogger;
use crate::ml::{
    inferencer::score_all,
    tabular_model::{TabularClassifier, TabularClassifierConfig},
    trainer::{fit_binary, TrainingConfig},
    InferBackend, TrainBackend,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabularConfig {
    /// JSON array of {"values": {...}, "label"}; bundled customers when None
    pub rows:          Option<String>,
    pub metrics_dir:   Option<String>,
    pub categorical:   Vec<String>,
    pub continuous:    Vec<String>,
    pub embedding_dim: usize,
    pub d_model:       usize,
    pub num_heads:     usize,
    pub num_layers:    usize,
    pub d_ff:          usize,
    pub dropout:       f64,
    pub batch_size:    usize,
    pub epochs:        usize,
    pub lr:            f64,
    pub shuffle_seed:  Option<u64>,
    pub seed:          u64,
}

impl Default for TabularConfig {
    fn default() -> Self {
        let schema = BundledCustomers::schema();
        Self {
            rows:          None,
            metrics_dir:   None,
            categorical:   schema.categorical,
            continuous:    schema.continuous,
            embedding_dim: 8,
            d_model:       32,
            num_heads:     4,
            num_layers:    2,
            d_ff:          64,
            dropout:       0.1,
            batch_size:    2,
            epochs:        10,
            lr:            1e-3,
            shuffle_seed:  None,
            seed:          42,
        }
    }
}

pub struct TabularUseCase {
    config: TabularConfig,
}

impl TabularUseCase {
    pub fn new(config: TabularConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<RunReport> {
        let cfg    = &self.config;
        let device = Device::<TrainBackend>::default();
        TrainBackend::seed(cfg.seed);

        // ── Step 1: Load customer rows ────────────────────────────────────────
        let rows: Vec<TabularRow> = match &cfg.rows {
            Some(path) => JsonRecordFile::<TabularRow>::new(path).load_all()?,
            None       => BundledCustomers.load_all()?,
        };
        if rows.is_empty() {
            return Err(PipelineError::EmptyDataset("fit the tabular encoders").into());
        }
        tracing::info!("Loaded {} customer rows", rows.len());

        // ── Step 2: Fit encoders + transform ──────────────────────────────────
        let schema  = TabularSchema::new(cfg.categorical.clone(), cfg.continuous.clone());
        let encoder = TabularEncoder::fit(schema, &rows)?;
        let table   = encoder.transform(&rows)?;
        tracing::info!(
            "Encoded table: categorical {:?}, continuous {:?}, cardinalities {:?}",
            table.categorical_shape(),
            table.continuous_shape(),
            encoder.cardinalities(),
        );

        // ── Step 3: Build the propensity model ────────────────────────────────
        let model_cfg = TabularClassifierConfig::new(encoder.cardinalities(), table.num_continuous)
            .with_embedding_dim(cfg.embedding_dim)
            .with_d_model(cfg.d_model)
            .with_num_heads(cfg.num_heads)
            .with_num_layers(cfg.num_layers)
            .with_d_ff(cfg.d_ff)
            .with_dropout(cfg.dropout);
        model_cfg.validate()?;

        let model: TabularClassifier<TrainBackend> = model_cfg.init(&device);
        tracing::info!("Tabular classifier ready: {} parameters", model.num_params());

        // ── Step 4: Train ─────────────────────────────────────────────────────
        let mut builder = DataLoaderBuilder::new(TabularBatcher::<TrainBackend>::new(device.clone()))
            .batch_size(cfg.batch_size);
        if let Some(seed) = cfg.shuffle_seed {
            builder = builder.shuffle(seed);
        }
        let train_loader = builder.build(TabularDataset::new(table.clone()));

        let outcome = fit_binary::<TrainBackend, _, _>(
            model,
            train_loader,
            &TrainingConfig { epochs: cfg.epochs, lr: cfg.lr },
        );

        if let Some(dir) = &cfg.metrics_dir {
            MetricsLogger::new(dir, "tabular")?.log_all(&outcome.history)?;
        }

        // ── Step 5: Score every row ───────────────────────────────────────────
        let model_valid  = outcome.model.valid();
        let infer_loader = DataLoaderBuilder::new(TabularBatcher::<InferBackend>::new(device))
            .batch_size(cfg.batch_size)
            .build(TabularDataset::new(table));
        let predictions = score_all::<InferBackend, _, _>(&model_valid, infer_loader)?;

        for (i, (row, p)) in rows.iter().zip(&predictions).enumerate() {
            println!(
                "[{i:>3}] logit={:+.4} prob={:.4} pred={} label={}",
                p.logit, p.probability, p.label, row.label,
            );
        }

        Ok(RunReport { history: outcome.history, predictions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::CellValue;

    fn one_epoch() -> TabularConfig {
        TabularConfig { epochs: 1, ..TabularConfig::default() }
    }

    #[test]
    fn test_bundled_customers_end_to_end() {
        let report = TabularUseCase::new(one_epoch()).execute().unwrap();

        assert_eq!(report.history.len(), 1);
        assert_eq!(report.history[0].batches, 3);
        assert_eq!(report.history[0].samples, 5);
        assert_eq!(report.predictions.len(), 5);
        for p in &report.predictions {
            assert!((0.0..=1.0).contains(&p.probability));
            assert_eq!(p.label, u8::from(p.probability >= 0.5));
        }
    }

    #[test]
    fn test_shuffled_batches_cover_every_row() {
        let cfg    = TabularConfig { shuffle_seed: Some(3), ..one_epoch() };
        let report = TabularUseCase::new(cfg).execute().unwrap();

        assert_eq!(report.history[0].batches, 3);
        assert_eq!(report.history[0].samples, 5);
        assert_eq!(report.predictions.len(), 5);
    }

    #[test]
    fn test_no_stack_and_metrics_csv() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TabularConfig {
            num_layers:  0,
            metrics_dir: Some(dir.path().display().to_string()),
            ..one_epoch()
        };
        let report = TabularUseCase::new(cfg).execute().unwrap();
        assert_eq!(report.predictions.len(), 5);

        let csv = std::fs::read_to_string(dir.path().join("metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn test_rows_from_file() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        let rows = vec![
            TabularRow::new([("plan", CellValue::from("basic")), ("tenure", CellValue::from(3.0))], 0),
            TabularRow::new([("plan", CellValue::from("pro")), ("tenure", CellValue::from(24.0))], 1),
            TabularRow::new([("plan", CellValue::from("pro")), ("tenure", CellValue::from(12.0))], 1),
        ];
        std::fs::write(&path, serde_json::to_string(&rows).unwrap()).unwrap();

        let cfg = TabularConfig {
            rows:        Some(path.display().to_string()),
            categorical: vec!["plan".into()],
            continuous:  vec!["tenure".into()],
            ..one_epoch()
        };
        let report = TabularUseCase::new(cfg).execute().unwrap();
        assert_eq!(report.predictions.len(), 3);
        assert_eq!(report.history[0].batches, 2);
    }

    #[test]
    fn test_unknown_column_fails_before_training() {
        let cfg = TabularConfig {
            categorical: vec!["gender".into(), "country".into()],
            ..one_epoch()
        };
        let err = TabularUseCase::new(cfg).execute().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_indivisible_heads_rejected() {
        let cfg = TabularConfig { d_model: 30, num_heads: 4, ..one_epoch() };
        assert!(TabularUseCase::new(cfg).execute().is_err());
    }
}
