// ============================================================
// Layer 2 — TextUseCase (Pipeline A)
// ============================================================
//   Step 1: Load transcripts           (Layer 4 - data)
//   Step 2: Encoder + tokenizer        (Layer 6 - infra, or fresh)
//   Step 3: Attach the classifier head (Layer 5 - ml)
//   Step 4: Tokenise + pad             (Layer 4 - data)
//   Step 5: Train                      (Layer 5 - ml)
//   Step 6: Score every transcript     (Layer 5 - ml)

use anyhow::{Context, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::{AutodiffModule, Module},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use crate::application::RunReport;
use crate::data::{
    preprocessor::Preprocessor,
    records::{BundledTranscripts, JsonRecordFile},
    text_batcher::TextBatcher,
    text_dataset::{TextDataset, TextEncoder, TextSample},
};
use crate::domain::{error::PipelineError, record::TextRecord, traits::RecordSource};
use crate::infra::{
    metrics::MetricsLogger,
    pretrained::PretrainedStore,
    tokenizer_store::{build_word_level, max_token_id, TokenizerStore},
};
use crate::ml::{
    inferencer::score_all,
    text_classifier::{TextClassifier, TextClassifierConfig},
    text_encoder::TextEncoderConfig,
    text_head::TextHeadConfig,
    trainer::{fit_binary, TrainingConfig},
    InferBackend, TrainBackend,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// JSON array of {"text", "label"}; bundled transcripts when None
    pub records:        Option<String>,
    /// Directory with encoder_config.json, encoder.mpk.gz, tokenizer.json
    pub model_dir:      Option<String>,
    pub metrics_dir:    Option<String>,
    pub max_seq_len:    usize,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub d_model:        usize,
    pub num_heads:      usize,
    pub num_layers:     usize,
    pub d_ff:           usize,
    pub head_hidden_1:  usize,
    pub head_hidden_2:  usize,
    pub dropout:        f64,
    pub vocab_size:     usize,
    pub freeze_encoder: bool,
    pub shuffle_seed:   Option<u64>,
    pub seed:           u64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            records:        None,
            model_dir:      None,
            metrics_dir:    None,
            max_seq_len:    200,
            batch_size:     4,
            epochs:         3,
            lr:             2e-5,
            d_model:        128,
            num_heads:      4,
            num_layers:     2,
            d_ff:           512,
            head_hidden_1:  256,
            head_hidden_2:  64,
            dropout:        0.1,
            vocab_size:     30522,
            freeze_encoder: false,
            shuffle_seed:   None,
            seed:           42,
        }
    }
}

pub struct TextUseCase {
    config: TextConfig,
}

impl TextUseCase {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<RunReport> {
        let cfg    = &self.config;
        let device = Device::<TrainBackend>::default();
        TrainBackend::seed(cfg.seed);

        // ── Step 1: Load transcripts ──────────────────────────────────────────
        let records: Vec<TextRecord> = match &cfg.records {
            Some(path) => JsonRecordFile::<TextRecord>::new(path).load_all()?,
            None       => BundledTranscripts.load_all()?,
        };
        if records.is_empty() {
            return Err(PipelineError::EmptyDataset("train the text classifier").into());
        }
        tracing::info!("Loaded {} transcripts", records.len());

        // ── Step 2: Encoder + tokenizer ───────────────────────────────────────
        let (encoder_cfg, encoder, tokenizer) = match &cfg.model_dir {
            Some(dir) => {
                let store = PretrainedStore::new(dir);
                let (encoder_cfg, encoder) = store.load_encoder::<TrainBackend>(&device)?;
                let tokenizer = TokenizerStore::new(store.dir().clone())
                    .load()
                    .with_context(|| format!("Model dir '{dir}' has no usable tokenizer"))?;
                (encoder_cfg, encoder, tokenizer)
            }
            None => {
                let prep   = Preprocessor::new();
                let corpus: Vec<String> = records.iter().map(|r| prep.clean(&r.text)).collect();
                let tokenizer   = build_word_level(&corpus, cfg.vocab_size)?;
                let encoder_cfg = self.fresh_encoder_config();
                let encoder     = encoder_cfg.init::<TrainBackend>(&device);
                tracing::info!("No model dir given, encoder initialised randomly");
                (encoder_cfg, encoder, tokenizer)
            }
        };

        if let Some(max_id) = max_token_id(&tokenizer) {
            if max_id as usize >= encoder_cfg.vocab_size {
                return Err(PipelineError::InvalidConfig(format!(
                    "tokenizer emits ids up to {max_id} but the encoder embeds only {} tokens",
                    encoder_cfg.vocab_size
                )).into());
            }
        }
        if cfg.max_seq_len > encoder_cfg.max_seq_len {
            return Err(PipelineError::InvalidConfig(format!(
                "max_seq_len {} exceeds the encoder's {} positions",
                cfg.max_seq_len, encoder_cfg.max_seq_len
            )).into());
        }

        // ── Step 3: Attach the classifier head ────────────────────────────────
        let head_cfg = TextHeadConfig::new(encoder_cfg.d_model)
            .with_hidden_1(cfg.head_hidden_1)
            .with_hidden_2(cfg.head_hidden_2)
            .with_dropout(cfg.dropout);
        TextClassifierConfig::new(encoder_cfg.clone(), head_cfg.clone()).validate()?;

        let encoder = if cfg.freeze_encoder {
            tracing::info!("Encoder frozen, training the head only");
            encoder.no_grad()
        } else {
            encoder
        };
        let model: TextClassifier<TrainBackend> =
            TextClassifier::with_encoder(encoder, &head_cfg, &device)?;
        tracing::info!(
            "Text classifier ready: {} parameters",
            model.num_params()
        );

        // ── Step 4: Tokenise + pad ────────────────────────────────────────────
        let samples = encode_records(&tokenizer, &records, cfg.max_seq_len)?;

        // ── Step 5: Train ─────────────────────────────────────────────────────
        let mut builder = DataLoaderBuilder::new(TextBatcher::<TrainBackend>::new(device.clone()))
            .batch_size(cfg.batch_size);
        if let Some(seed) = cfg.shuffle_seed {
            builder = builder.shuffle(seed);
        }
        let train_loader = builder.build(TextDataset::new(samples.clone()));

        let outcome = fit_binary::<TrainBackend, _, _>(
            model,
            train_loader,
            &TrainingConfig { epochs: cfg.epochs, lr: cfg.lr },
        );

        if let Some(dir) = &cfg.metrics_dir {
            MetricsLogger::new(dir, "text")?.log_all(&outcome.history)?;
        }

        // ── Step 6: Score every transcript ────────────────────────────────────
        let model_valid = outcome.model.valid();
        let infer_loader = DataLoaderBuilder::new(TextBatcher::<InferBackend>::new(device))
            .batch_size(cfg.batch_size)
            .build(TextDataset::new(samples));
        let predictions = score_all::<InferBackend, _, _>(&model_valid, infer_loader)?;

        for (i, (record, p)) in records.iter().zip(&predictions).enumerate() {
            println!(
                "[{i:>3}] logit={:+.4} prob={:.4} pred={} label={} | {}",
                p.logit, p.probability, p.label, record.label, snippet(&record.text, 60),
            );
        }

        Ok(RunReport { history: outcome.history, predictions })
    }

    fn fresh_encoder_config(&self) -> TextEncoderConfig {
        let cfg = &self.config;
        TextEncoderConfig::new(
            cfg.vocab_size, cfg.max_seq_len, cfg.d_model,
            cfg.num_heads, cfg.num_layers, cfg.d_ff,
        )
        .with_dropout(cfg.dropout)
    }
}

fn encode_records(tokenizer: &Tokenizer, records: &[TextRecord], max_seq_len: usize) -> Result<Vec<TextSample>> {
    let samples = TextEncoder::new(tokenizer, max_seq_len)?.encode_all(records)?;
    tracing::info!(
        "Encoded {} transcripts (mean {:.1} tokens)",
        samples.len(),
        samples.iter().map(|s| s.token_count()).sum::<usize>() as f64 / samples.len().max(1) as f64,
    );
    Ok(samples)
}

fn snippet(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::record::{CompactRecorder, Recorder};
    use crate::ml::text_encoder::TextEncoder as EncoderModule;

    fn tiny() -> TextConfig {
        TextConfig {
            epochs:        1,
            batch_size:    3,
            d_model:       16,
            num_heads:     2,
            num_layers:    1,
            d_ff:          32,
            head_hidden_1: 8,
            head_hidden_2: 4,
            vocab_size:    300,
            ..TextConfig::default()
        }
    }

    #[test]
    fn test_bundled_transcripts_end_to_end() {
        let report = TextUseCase::new(tiny()).execute().unwrap();

        assert_eq!(report.history.len(), 1);
        assert_eq!(report.history[0].batches, 3); // 8 records, batches of 3
        assert_eq!(report.predictions.len(), 8);
        assert!(report.predictions.iter().all(|p| (0.0..=1.0).contains(&p.probability)));
    }

    /// Writes encoder_config.json, the encoder record and tokenizer.json.
    fn write_model_dir(
        dir:         &std::path::Path,
        encoder_cfg: &TextEncoderConfig,
        corpus:      &[String],
        tok_vocab:   usize,
    ) {
        std::fs::write(
            dir.join("encoder_config.json"),
            serde_json::to_string(encoder_cfg).unwrap(),
        ).unwrap();
        let encoder: EncoderModule<InferBackend> = encoder_cfg.init(&Default::default());
        CompactRecorder::new()
            .record(encoder.into_record(), dir.join("encoder"))
            .unwrap();
        build_word_level(corpus, tok_vocab)
            .unwrap()
            .save(dir.join("tokenizer.json"), false)
            .unwrap();
    }

    fn model_dir_config(dir: &tempfile::TempDir) -> TextConfig {
        TextConfig { model_dir: Some(dir.path().display().to_string()), ..tiny() }
    }

    fn invalid_config(err: anyhow::Error) -> bool {
        matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::InvalidConfig(_)))
    }

    #[test]
    fn test_pretrained_model_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_model_dir(
            dir.path(),
            &TextEncoderConfig::new(300, 200, 16, 2, 1, 32),
            &["upgrade cancel plan".to_string()],
            300,
        );

        let cfg = TextConfig { freeze_encoder: true, ..model_dir_config(&dir) };
        let report = TextUseCase::new(cfg).execute().unwrap();
        assert_eq!(report.predictions.len(), 8);
    }

    #[test]
    fn test_max_len_beyond_encoder_positions_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_model_dir(dir.path(), &TextEncoderConfig::new(300, 64, 16, 2, 1, 32), &[], 300);

        let err = TextUseCase::new(model_dir_config(&dir)).execute().unwrap_err();
        assert!(invalid_config(err));
    }

    #[test]
    fn test_vocab_below_special_ids_is_rejected() {
        let cfg = TextConfig { vocab_size: 64, ..tiny() };
        let err = TextUseCase::new(cfg).execute().unwrap_err();
        assert!(invalid_config(err));
    }

    #[test]
    fn test_tokenizer_larger_than_encoder_vocab_is_rejected() {
        // Encoder embeds ids 0..=103; the tokenizer adds words from 104 on
        let dir = tempfile::tempdir().unwrap();
        write_model_dir(
            dir.path(),
            &TextEncoderConfig::new(104, 200, 16, 2, 1, 32),
            &["upgrade cancel plan".to_string()],
            300,
        );

        let err = TextUseCase::new(model_dir_config(&dir)).execute().unwrap_err();
        assert!(invalid_config(err));
    }

    #[test]
    fn test_shuffled_batches_cover_every_transcript() {
        let cfg    = TextConfig { shuffle_seed: Some(7), ..tiny() };
        let report = TextUseCase::new(cfg).execute().unwrap();

        assert_eq!(report.history[0].batches, 3);
        assert_eq!(report.history[0].samples, 8);
        assert_eq!(report.predictions.len(), 8);
    }

    #[test]
    fn test_snippet() {
        assert_eq!(snippet("short", 10), "short");
        assert_eq!(snippet("abcdef", 3), "abc…");
    }
}
