// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// One subcommand per pipeline. Defaults mirror the application
// configs, so `propensity-heads text` and `propensity-heads tabular`
// run on the bundled records with no flags at all.

use clap::{Args, Subcommand};

use crate::application::{tabular_use_case::TabularConfig, text_use_case::TextConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify call transcripts (tokenizer → encoder → head)
    Text(TextArgs),

    /// Score customers from categorical + continuous columns
    Tabular(TabularArgs),
}

#[derive(Args, Debug)]
pub struct TextArgs {
    /// JSON file: [{"text": "...", "label": 0|1}, ...]
    #[arg(long)]
    pub records: Option<String>,

    /// Pretrained encoder directory (encoder_config.json, encoder.mpk.gz,
    /// tokenizer.json). A fresh encoder and word-level tokenizer are
    /// built when omitted.
    #[arg(long)]
    pub model_dir: Option<String>,

    /// Append per-epoch loss to <dir>/metrics.csv
    #[arg(long)]
    pub metrics_dir: Option<String>,

    /// Tokens per transcript, [CLS] and [SEP] included
    #[arg(long, default_value_t = 200)]
    pub max_seq_len: usize,

    #[arg(long, default_value_t = 4)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 3)]
    pub epochs: usize,

    #[arg(long, default_value_t = 2e-5)]
    pub lr: f64,

    /// Fresh encoder width; ignored with --model-dir
    #[arg(long, default_value_t = 128)]
    pub d_model: usize,

    #[arg(long, default_value_t = 4)]
    pub num_heads: usize,

    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    #[arg(long, default_value_t = 512)]
    pub d_ff: usize,

    #[arg(long, default_value_t = 256)]
    pub head_hidden_1: usize,

    #[arg(long, default_value_t = 64)]
    pub head_hidden_2: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,

    /// Train the head only
    #[arg(long)]
    pub freeze_encoder: bool,

    /// Shuffle training batches with this seed
    #[arg(long)]
    pub shuffle_seed: Option<u64>,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<TextArgs> for TextConfig {
    fn from(a: TextArgs) -> Self {
        TextConfig {
            records:        a.records,
            model_dir:      a.model_dir,
            metrics_dir:    a.metrics_dir,
            max_seq_len:    a.max_seq_len,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            d_model:        a.d_model,
            num_heads:      a.num_heads,
            num_layers:     a.num_layers,
            d_ff:           a.d_ff,
            head_hidden_1:  a.head_hidden_1,
            head_hidden_2:  a.head_hidden_2,
            dropout:        a.dropout,
            vocab_size:     a.vocab_size,
            freeze_encoder: a.freeze_encoder,
            shuffle_seed:   a.shuffle_seed,
            seed:           a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct TabularArgs {
    /// JSON file: [{"values": {"col": "x" | 1.5, ...}, "label": 0|1}, ...]
    #[arg(long)]
    pub rows: Option<String>,

    #[arg(long)]
    pub metrics_dir: Option<String>,

    /// Categorical column names, comma separated
    #[arg(long, value_delimiter = ',', default_value = "gender,region")]
    pub categorical: Vec<String>,

    /// Continuous column names, comma separated
    #[arg(long, value_delimiter = ',', default_value = "age,income")]
    pub continuous: Vec<String>,

    #[arg(long, default_value_t = 8)]
    pub embedding_dim: usize,

    #[arg(long, default_value_t = 32)]
    pub d_model: usize,

    #[arg(long, default_value_t = 4)]
    pub num_heads: usize,

    /// Single-token encoder blocks; 0 goes straight to the head
    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    #[arg(long, default_value_t = 64)]
    pub d_ff: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    #[arg(long, default_value_t = 2)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    #[arg(long)]
    pub shuffle_seed: Option<u64>,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<TabularArgs> for TabularConfig {
    fn from(a: TabularArgs) -> Self {
        TabularConfig {
            rows:          a.rows,
            metrics_dir:   a.metrics_dir,
            categorical:   a.categorical,
            continuous:    a.continuous,
            embedding_dim: a.embedding_dim,
            d_model:       a.d_model,
            num_heads:     a.num_heads,
            num_layers:    a.num_layers,
            d_ff:          a.d_ff,
            dropout:       a.dropout,
            batch_size:    a.batch_size,
            epochs:        a.epochs,
            lr:            a.lr,
            shuffle_seed:  a.shuffle_seed,
            seed:          a.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_tabular_defaults_match_bundled_schema() {
        let cli = Cli::try_parse_from(["propensity-heads", "tabular"]).unwrap();
        let Commands::Tabular(args) = cli.command else { panic!("expected tabular") };
        let cfg: TabularConfig = args.into();

        assert_eq!(cfg.categorical, vec!["gender", "region"]);
        assert_eq!(cfg.continuous, vec!["age", "income"]);
        assert_eq!(cfg.batch_size, 2);
    }

    #[test]
    fn test_column_lists_split_on_commas() {
        let cli = Cli::try_parse_from([
            "propensity-heads", "tabular",
            "--categorical", "plan,channel",
            "--continuous", "tenure",
            "--num-layers", "0",
        ]).unwrap();
        let Commands::Tabular(args) = cli.command else { panic!("expected tabular") };

        assert_eq!(args.categorical, vec!["plan", "channel"]);
        assert_eq!(args.continuous, vec!["tenure"]);
        assert_eq!(args.num_layers, 0);
    }

    #[test]
    fn test_text_flags() {
        let cli = Cli::try_parse_from([
            "propensity-heads", "text",
            "--model-dir", "models/enc",
            "--freeze-encoder",
            "--max-seq-len", "128",
        ]).unwrap();
        let Commands::Text(args) = cli.command else { panic!("expected text") };
        let cfg: TextConfig = args.into();

        assert_eq!(cfg.model_dir.as_deref(), Some("models/enc"));
        assert!(cfg.freeze_encoder);
        assert_eq!(cfg.max_seq_len, 128);
        assert_eq!(cfg.head_hidden_1, 256);
    }
}
