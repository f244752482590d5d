// ============================================================
// Layer 4 — Transcript Samples
// ============================================================
// Sequence format fed to the encoder:
//
//   [CLS] tok tok ... tok [SEP] [PAD] [PAD] ...
//   └──────── max_seq_len tokens in total ──────┘
//
// The pooled representation is read from position 0, so the
// [CLS] token must always be present; truncation drops tokens
// from the end of the transcript but keeps the final [SEP].

use anyhow::Result;
use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use crate::data::preprocessor::Preprocessor;
use crate::domain::error::PipelineError;
use crate::domain::record::TextRecord;

const PAD_ID: u32 = 0;
const CLS_ID: u32 = 101;
const SEP_ID: u32 = 102;

/// One tokenised, padded transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSample {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub label:          u8,
}

impl TextSample {
    /// Number of real (non-padding) tokens.
    pub fn token_count(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m == 1).count()
    }
}

/// Turns raw transcripts into fixed-length samples.
pub struct TextEncoder<'a> {
    tokenizer:    &'a Tokenizer,
    preprocessor: Preprocessor,
    max_seq_len:  usize,
    pad_id:       u32,
    cls_id:       u32,
    sep_id:       u32,
}

impl<'a> TextEncoder<'a> {
    /// Special ids come from the tokenizer's vocabulary when it has
    /// them, otherwise the BERT defaults are used.
    pub fn new(tokenizer: &'a Tokenizer, max_seq_len: usize) -> Result<Self> {
        if max_seq_len < 2 {
            return Err(PipelineError::InvalidConfig(format!(
                "max_seq_len must hold [CLS] and [SEP], got {max_seq_len}"
            )).into());
        }
        Ok(Self {
            tokenizer,
            preprocessor: Preprocessor::new(),
            max_seq_len,
            pad_id: tokenizer.token_to_id("[PAD]").unwrap_or(PAD_ID),
            cls_id: tokenizer.token_to_id("[CLS]").unwrap_or(CLS_ID),
            sep_id: tokenizer.token_to_id("[SEP]").unwrap_or(SEP_ID),
        })
    }

    pub fn encode(&self, text: &str, label: u8) -> Result<TextSample> {
        let clean = self.preprocessor.clean(text);
        let enc   = self.tokenizer
            .encode(clean.as_str(), false)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;

        let body_len = enc.get_ids().len().min(self.max_seq_len - 2);

        let mut input_ids = Vec::with_capacity(self.max_seq_len);
        input_ids.push(self.cls_id);
        input_ids.extend_from_slice(&enc.get_ids()[..body_len]);
        input_ids.push(self.sep_id);

        let real_len           = input_ids.len();
        let mut attention_mask = vec![1u32; real_len];
        input_ids.resize(self.max_seq_len, self.pad_id);
        attention_mask.resize(self.max_seq_len, 0);

        Ok(TextSample { input_ids, attention_mask, label })
    }

    pub fn encode_all(&self, records: &[TextRecord]) -> Result<Vec<TextSample>> {
        records.iter().map(|r| self.encode(&r.text, r.label)).collect()
    }
}

pub struct TextDataset {
    samples: Vec<TextSample>,
}

impl TextDataset {
    pub fn new(samples: Vec<TextSample>) -> Self { Self { samples } }
}

impl Dataset<TextSample> for TextDataset {
    fn get(&self, index: usize) -> Option<TextSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
