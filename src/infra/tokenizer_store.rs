// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Either loads `tokenizer.json` from a directory (the tokenizer
// shipped with a pretrained encoder) or builds a word-level
// tokenizer in memory from the training transcripts.
//
// Built vocabularies use the BERT special ids:
//   [PAD]=0  [UNK]=1  [CLS]=101  [SEP]=102  [MASK]=103
// and number corpus words from 104 upwards, never reaching
// vocab_size so every id fits the embedding table.
//
// Corpus words are cut with the same normalizer and
// pre-tokenizer the built tokenizer runs, so every vocabulary
// entry is a piece `encode` can actually emit.

use anyhow::Result;
use std::{collections::HashMap, path::PathBuf};
use tokenizers::{
    normalizers::bert::BertNormalizer,
    pre_tokenizers::whitespace::Whitespace,
    OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer, Normalizer, Tokenizer,
};

use crate::domain::error::PipelineError;

const FIRST_WORD_ID: usize = 104;

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.dir.join("tokenizer.json");
        tracing::info!("Loading tokenizer from '{}'", path.display());
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e))
    }
}

/// Largest id the tokenizer can emit, added tokens included.
pub fn max_token_id(tokenizer: &Tokenizer) -> Option<u32> {
    tokenizer.get_vocab(true).into_values().max()
}

/// Must match the "normalizer" entry of the built tokenizer JSON.
fn normalizer() -> BertNormalizer {
    BertNormalizer::new(true, true, None, true)
}

/// Split text into the pieces the built tokenizer looks up.
fn word_pieces(text: &str) -> Result<Vec<String>> {
    let norm = normalizer();
    let mut pretok = PreTokenizedString::from(text);
    pretok
        .normalize(|s| norm.normalize(s))
        .map_err(|e| anyhow::anyhow!("Cannot normalise text: {e}"))?;
    Whitespace {}
        .pre_tokenize(&mut pretok)
        .map_err(|e| anyhow::anyhow!("Cannot pre-tokenise text: {e}"))?;

    Ok(pretok
        .get_splits(OffsetReferential::Original, OffsetType::Byte)
        .into_iter()
        .map(|(piece, _, _)| piece.to_string())
        .collect())
}

/// Word-level tokenizer over the most frequent corpus words.
///
/// `vocab_size` must leave room above the special ids.
pub fn build_word_level(texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
    if vocab_size < FIRST_WORD_ID {
        return Err(PipelineError::InvalidConfig(format!(
            "vocab_size {vocab_size} cannot hold the special ids up to [MASK]=103"
        )).into());
    }
    tracing::info!("Building word-level tokenizer (vocab_size={})", vocab_size);

    let mut freq: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for piece in word_pieces(text)? {
            *freq.entry(piece).or_insert(0) += 1;
        }
    }

    // Most frequent first; ties broken alphabetically so the same
    // corpus always yields the same ids
    let mut words: Vec<(String, usize)> = freq.into_iter().collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    words.truncate(vocab_size - FIRST_WORD_ID);

    let mut vocab = serde_json::json!({
        "[PAD]":  0,
        "[UNK]":  1,
        "[CLS]":  101,
        "[SEP]":  102,
        "[MASK]": 103,
    });
    for (i, (word, _)) in words.iter().enumerate() {
        vocab[word] = serde_json::json!(FIRST_WORD_ID + i);
    }

    let special = |id: usize, content: &str| serde_json::json!({
        "id": id, "content": content, "single_word": false, "lstrip": false,
        "rstrip": false, "normalized": false, "special": true
    });

    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [
            special(0, "[PAD]"),
            special(1, "[UNK]"),
            special(101, "[CLS]"),
            special(102, "[SEP]"),
            special(103, "[MASK]"),
        ],
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": null,
            "lowercase": true
        },
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    });

    let tokenizer: Tokenizer = serde_json::to_string(&tokenizer_json)?
        .parse()
        .map_err(|e| anyhow::anyhow!("Cannot build tokenizer: {e}"))?;

    tracing::info!("Tokenizer built with {} corpus words", words.len());
    Ok(tokenizer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_built_ids_stay_below_vocab_size() {
        let corpus = vec!["a b c d e f g h i j k l".to_string()];
        let tok    = build_word_level(&corpus, 110).unwrap();

        let enc = tok.encode("a b c d e f g h i j k l", false).unwrap();
        assert!(enc.get_ids().iter().all(|&id| (id as usize) < 110));
        assert_eq!(max_token_id(&tok), Some(109));
        // Only six corpus words fit; the rest fall back to [UNK]
        assert_eq!(enc.get_ids().iter().filter(|&&id| id == 1).count(), 6);
    }

    #[test]
    fn test_vocab_too_small_for_special_ids() {
        let corpus = vec!["upgrade my plan".to_string()];
        for vocab_size in [0, 64, 103] {
            let err = build_word_level(&corpus, vocab_size).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<PipelineError>(),
                Some(PipelineError::InvalidConfig(_))
            ));
        }
        // Room for the specials only: every word is [UNK]
        let tok = build_word_level(&corpus, 104).unwrap();
        assert_eq!(max_token_id(&tok), Some(103));
    }

    #[test]
    fn test_every_vocabulary_word_is_emitted() {
        let corpus = vec![
            "I'd love to upgrade, nobody called me back.".to_string(),
            "I'm switching providers next week!".to_string(),
        ];
        let tok = build_word_level(&corpus, 500).unwrap();

        let emitted: HashSet<u32> = corpus
            .iter()
            .flat_map(|t| tok.encode(t.as_str(), false).unwrap().get_ids().to_vec())
            .collect();
        assert!(!emitted.contains(&1), "corpus text produced [UNK]");

        for (word, id) in tok.get_vocab(false) {
            if id as usize >= FIRST_WORD_ID {
                assert!(emitted.contains(&id), "'{word}' is never produced by encode");
            }
        }

        let enc = tok.encode("I'd love to upgrade", false).unwrap();
        assert_eq!(enc.get_tokens(), ["i", "'", "d", "love", "to", "upgrade"]);
    }

    #[test]
    fn test_loads_saved_tokenizer() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path());
        assert!(store.load().is_err());

        let built = build_word_level(&["upgrade my plan".to_string()], 200).unwrap();
        built.save(dir.path().join("tokenizer.json"), false).unwrap();

        let tok = store.load().unwrap();
        assert_eq!(tok.token_to_id("[CLS]"), Some(101));
        assert_eq!(tok.token_to_id("upgrade"), built.token_to_id("upgrade"));
    }
}
