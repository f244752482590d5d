// ============================================================
// Layer 6 — Pretrained Encoder Store
// ============================================================
// Reads a pretrained transcript encoder from a model directory:
//
//   <model_dir>/
//     encoder_config.json   ← TextEncoderConfig (architecture)
//     encoder.mpk.gz        ← Burn CompactRecorder weights
//     tokenizer.json        ← HuggingFace tokenizer (TokenizerStore)
//
// The config is read first so the encoder can be rebuilt with the
// exact architecture before the weights are loaded into it;
// CompactRecorder refuses a record that does not match.

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use std::{fs, path::PathBuf};

use crate::ml::text_encoder::{TextEncoder, TextEncoderConfig};

pub struct PretrainedStore {
    dir: PathBuf,
}

impl PretrainedStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    pub fn load_config(&self) -> Result<TextEncoderConfig> {
        let path = self.dir.join("encoder_config.json");
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read encoder config from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed encoder config '{}'", path.display()))
    }

    /// Rebuild the encoder from its config and load the stored weights.
    pub fn load_encoder<B: Backend>(&self, device: &B::Device) -> Result<(TextEncoderConfig, TextEncoder<B>)> {
        let cfg     = self.load_config()?;
        let encoder = cfg.init::<B>(device);
        let path    = self.dir.join("encoder");

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load encoder weights '{}'", path.display()))?;

        tracing::info!(
            "Pretrained encoder loaded: {} layers, d_model={}",
            cfg.num_layers, cfg.d_model
        );
        Ok((cfg, encoder.load_record(record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::module::Module;

    fn tiny() -> TextEncoderConfig {
        TextEncoderConfig::new(300, 16, 8, 2, 1, 16)
    }

    #[test]
    fn test_loads_config_and_weights() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let cfg    = tiny();

        fs::write(
            dir.path().join("encoder_config.json"),
            serde_json::to_string(&cfg).unwrap(),
        ).unwrap();
        let encoder: TextEncoder<NdArray> = cfg.init(&device);
        CompactRecorder::new()
            .record(encoder.into_record(), dir.path().join("encoder"))
            .unwrap();

        let (loaded_cfg, _) = PretrainedStore::new(dir.path())
            .load_encoder::<NdArray>(&device)
            .unwrap();
        assert_eq!(loaded_cfg.d_model, 8);
        assert_eq!(loaded_cfg.max_seq_len, 16);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let store = PretrainedStore::new("no/such/model");
        assert!(store.load_config().is_err());
    }
}
