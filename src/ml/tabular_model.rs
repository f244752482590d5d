// ============================================================
// Layer 5 — Tabular Propensity Model (Pipeline B)
// ============================================================
//
//   categorical [B, C] ─► C embedding tables ─► [B, C·e] ┐
//                                                        ├─ concat ─► Linear ─► [B, d_model]
//   continuous  [B, K] (already standardised) ─────────► ┘
//
//   [B, d_model] ─► view as [B, 1, d_model] ─► N encoder blocks
//                ─► [B, d_model] ─► BinaryHead ─► logits [B]
//
// The embeddings and the continuous features are concatenated and
// projected once, so no width has to match another by construction.
//
// With a sequence of length 1, self-attention can only attend to the
// token itself; the block stack contributes its feed-forward and
// normalisation sublayers. num_layers = 0 removes it entirely.

use burn::{
    nn::{Embedding, EmbeddingConfig, Linear, LinearConfig},
    prelude::*,
};

use crate::data::tabular_batcher::TabularBatch;
use crate::domain::error::PipelineError;
use crate::ml::{
    binary_head::BinaryHead,
    encoder_block::{EncoderBlock, EncoderBlockConfig},
    BinaryClassifier,
};

#[derive(Config, Debug)]
pub struct TabularClassifierConfig {
    /// One entry per categorical column: the number of fitted classes.
    pub cardinalities:  Vec<usize>,
    pub num_continuous: usize,
    #[config(default = 8)]
    pub embedding_dim:  usize,
    #[config(default = 32)]
    pub d_model:        usize,
    #[config(default = 4)]
    pub num_heads:      usize,
    #[config(default = 2)]
    pub num_layers:     usize,
    #[config(default = 64)]
    pub d_ff:           usize,
    #[config(default = 0.1)]
    pub dropout:        f64,
}

impl TabularClassifierConfig {
    /// Width of the concatenated feature vector fed to the projection.
    pub fn feature_width(&self) -> usize {
        self.cardinalities.len() * self.embedding_dim + self.num_continuous
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.feature_width() == 0 {
            return Err(PipelineError::InvalidConfig("no input features".into()));
        }
        if let Some(col) = self.cardinalities.iter().position(|&c| c == 0) {
            return Err(PipelineError::InvalidConfig(format!(
                "categorical column {col} has no fitted classes"
            )));
        }
        if self.num_layers > 0 && (self.num_heads == 0 || self.d_model % self.num_heads != 0) {
            return Err(PipelineError::InvalidConfig(format!(
                "d_model {} is not divisible by num_heads {}",
                self.d_model, self.num_heads
            )));
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> TabularClassifier<B> {
        let embeddings = self.cardinalities
            .iter()
            .map(|&n| EmbeddingConfig::new(n, self.embedding_dim).init(device))
            .collect();
        let projection = LinearConfig::new(self.feature_width(), self.d_model).init(device);

        let block_cfg = EncoderBlockConfig::new(self.d_model, self.num_heads, self.d_ff)
            .with_dropout(self.dropout);
        let blocks = (0..self.num_layers).map(|_| block_cfg.init(device)).collect();

        TabularClassifier {
            embedder: TabularEmbedder {
                embeddings,
                projection,
                embedding_dim:  self.embedding_dim,
                num_continuous: self.num_continuous,
            },
            blocks,
            head: BinaryHead::new(self.d_model, device),
        }
    }
}

/// Feature encoder: per-column embeddings + continuous features → d_model.
#[derive(Module, Debug)]
pub struct TabularEmbedder<B: Backend> {
    pub embeddings:     Vec<Embedding<B>>,
    pub projection:     Linear<B>,
    pub embedding_dim:  usize,
    pub num_continuous: usize,
}

impl<B: Backend> TabularEmbedder<B> {
    /// categorical: [batch, C] Int, continuous: [batch, K] → [batch, d_model]
    pub fn forward(&self, categorical: Tensor<B, 2, Int>, continuous: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch_size, _] = categorical.dims();

        let mut parts: Vec<Tensor<B, 2>> = Vec::with_capacity(self.embeddings.len() + 1);
        for (col, table) in self.embeddings.iter().enumerate() {
            let idx = categorical.clone().slice([0..batch_size, col..col + 1]);
            parts.push(table.forward(idx).reshape([batch_size, self.embedding_dim]));
        }
        if self.num_continuous > 0 {
            parts.push(continuous);
        }

        self.projection.forward(Tensor::cat(parts, 1))
    }
}

#[derive(Module, Debug)]
pub struct TabularClassifier<B: Backend> {
    pub embedder: TabularEmbedder<B>,
    pub blocks:   Vec<EncoderBlock<B>>,
    pub head:     BinaryHead<B>,
}

impl<B: Backend> TabularClassifier<B> {
    /// Refined representation after the interaction blocks: [batch, d_model]
    pub fn representation(&self, categorical: Tensor<B, 2, Int>, continuous: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.embedder.forward(categorical, continuous);
        if self.blocks.is_empty() {
            return x;
        }

        let [batch_size, d_model] = x.dims();
        let mut x = x.reshape([batch_size, 1, d_model]);
        for block in &self.blocks {
            x = block.forward(x, None);
        }
        x.reshape([batch_size, d_model])
    }

    pub fn forward(&self, categorical: Tensor<B, 2, Int>, continuous: Tensor<B, 2>) -> Tensor<B, 1> {
        self.head.forward(self.representation(categorical, continuous))
    }
}

impl<B: Backend> BinaryClassifier<B, TabularBatch<B>> for TabularClassifier<B> {
    fn forward_logits(&self, batch: &TabularBatch<B>) -> Tensor<B, 1> {
        self.forward(batch.categorical.clone(), batch.continuous.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::records::BundledCustomers;
    use crate::data::tabular_batcher::TabularBatcher;
    use crate::data::tabular_encoder::TabularEncoder;
    use crate::domain::traits::RecordSource;
    use burn::backend::NdArray;
    use burn::data::dataloader::batcher::Batcher;

    fn example_batch(device: &<NdArray as Backend>::Device) -> (TabularEncoder, TabularBatch<NdArray>) {
        let rows  = BundledCustomers.load_all().unwrap();
        let enc   = TabularEncoder::fit(BundledCustomers::schema(), &rows).unwrap();
        let table = enc.transform(&rows).unwrap();
        (enc, TabularBatcher::<NdArray>::new(device.clone()).batch(table.rows))
    }

    #[test]
    fn test_example_forward_shapes() {
        let device       = Default::default();
        let (enc, batch) = example_batch(&device);
        let cfg   = TabularClassifierConfig::new(enc.cardinalities(), 2).with_embedding_dim(4);
        let model = cfg.init::<NdArray>(&device);

        assert_eq!(cfg.feature_width(), 10);
        assert_eq!(model.embedder.forward(batch.categorical.clone(), batch.continuous.clone()).dims(), [5, 32]);
        assert_eq!(model.forward_logits(&batch).dims(), [5]);
    }

    #[test]
    fn test_identical_rows_identical_representation() {
        let device       = Default::default();
        let (enc, batch) = example_batch(&device);
        let model = TabularClassifierConfig::new(enc.cardinalities(), 2).init::<NdArray>(&device);

        // Rows 0 and 0 again, stacked into one batch
        let cat  = Tensor::cat(vec![batch.categorical.clone().slice([0..1, 0..2]); 2], 0);
        let cont = Tensor::cat(vec![batch.continuous.clone().slice([0..1, 0..2]); 2], 0);

        let repr = model.representation(cat, cont);
        let a = repr.clone().slice([0..1, 0..32]);
        let b = repr.slice([1..2, 0..32]);
        a.into_data().assert_approx_eq(&b.into_data(), 5);
    }

    #[test]
    fn test_zero_layers_skips_interaction_stack() {
        let device       = Default::default();
        let (enc, batch) = example_batch(&device);
        let model = TabularClassifierConfig::new(enc.cardinalities(), 2)
            .with_num_layers(0)
            .init::<NdArray>(&device);

        assert!(model.blocks.is_empty());
        assert_eq!(model.forward_logits(&batch).dims(), [5]);
    }

    #[test]
    fn test_categorical_only_and_continuous_only() {
        let device = Default::default();
        let cat_only = TabularClassifierConfig::new(vec![3], 0).init::<NdArray>(&device);
        let cat  = Tensor::<NdArray, 1, Int>::from_ints([0, 2], &device).reshape([2, 1]);
        let none = Tensor::<NdArray, 2>::zeros([2, 0], &device);
        assert_eq!(cat_only.forward(cat, none).dims(), [2]);

        let cont_only = TabularClassifierConfig::new(vec![], 3).init::<NdArray>(&device);
        let no_cat = Tensor::<NdArray, 2, Int>::zeros([2, 0], &device);
        let cont   = Tensor::<NdArray, 2>::ones([2, 3], &device);
        assert_eq!(cont_only.forward(no_cat, cont).dims(), [2]);
    }

    #[test]
    fn test_validate() {
        assert!(TabularClassifierConfig::new(vec![2, 4], 2).validate().is_ok());
        assert!(TabularClassifierConfig::new(vec![], 0).validate().is_err());
        assert!(TabularClassifierConfig::new(vec![2, 0], 1).validate().is_err());
        assert!(TabularClassifierConfig::new(vec![2], 1).with_num_heads(5).validate().is_err());
        assert!(TabularClassifierConfig::new(vec![2], 1)
            .with_num_heads(5)
            .with_num_layers(0)
            .validate()
            .is_ok());
    }
}
