// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes to a Layer 2 use case.
//
//   `text`    — Pipeline A: transcript encoder + classifier head
//   `tabular` — Pipeline B: embeddings + continuous features
//
// Either command trains on the given (or bundled) records, then
// prints one logit / probability / 0-1 prediction per record.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, TabularArgs, TextArgs};

use crate::application::RunReport;

#[derive(Parser, Debug)]
#[command(
    name = "propensity-heads",
    version = "0.1.0",
    about = "Binary propensity classifiers over call transcripts and customer tables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Text(args)    => run_text(args),
            Commands::Tabular(args) => run_tabular(args),
        }
    }
}

fn run_text(args: TextArgs) -> Result<()> {
    use crate::application::text_use_case::TextUseCase;

    tracing::info!(
        "Text pipeline: records={}, model_dir={}",
        args.records.as_deref().unwrap_or("<bundled>"),
        args.model_dir.as_deref().unwrap_or("<fresh>"),
    );
    let report = TextUseCase::new(args.into()).execute()?;
    print_summary(&report);
    Ok(())
}

fn run_tabular(args: TabularArgs) -> Result<()> {
    use crate::application::tabular_use_case::TabularUseCase;

    tracing::info!(
        "Tabular pipeline: rows={}",
        args.rows.as_deref().unwrap_or("<bundled>"),
    );
    let report = TabularUseCase::new(args.into()).execute()?;
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &RunReport) {
    match report.history.last() {
        Some(last) => println!(
            "\nTrained {} epochs, final avg loss {:.4}. Scored {} records.",
            report.history.len(),
            last.avg_loss,
            report.predictions.len()
        ),
        None => println!("\nNo training epochs run. Scored {} records.", report.predictions.len()),
    }
}
