// ============================================================
// Layer 6 — Epoch Metrics Logger
// ============================================================
// Appends one CSV row per training epoch:
//
//   pipeline,epoch,avg_loss,batches,samples
//   tabular,1,0.712345,3,5
//   tabular,2,0.690112,3,5
//
// Several runs and both pipelines can share one file; the header
// is written only when the file is created.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use crate::ml::trainer::EpochMetrics;

pub struct MetricsLogger {
    csv_path: PathBuf,
    pipeline: &'static str,
}

impl MetricsLogger {
    pub fn new(dir: impl Into<PathBuf>, pipeline: &'static str) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create metrics dir '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "pipeline,epoch,avg_loss,batches,samples")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path, pipeline })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{},{:.6},{},{}",
            self.pipeline, m.epoch, m.avg_loss, m.batches, m.samples,
        )?;
        Ok(())
    }

    pub fn log_all(&self, metrics: &[EpochMetrics]) -> Result<()> {
        metrics.iter().try_for_each(|m| self.log(m))
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
