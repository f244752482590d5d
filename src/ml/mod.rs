// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn module code lives here.
//
//   encoder_block.rs   — post-norm transformer block shared by both
//                        pipelines (self-attention + GELU FFN)
//   text_encoder.rs    — token + position embeddings, block stack,
//                        [CLS] pooling (Pipeline A feature encoder)
//   text_head.rs       — 3-layer tanh/dropout head → 1 logit
//   text_classifier.rs — encoder + head, trainable end to end
//   tabular_model.rs   — per-column embeddings + continuous features
//                        → projection → single-token block stack
//                        → BinaryHead (Pipeline B)
//   binary_head.rs     — Linear → 1 logit, sigmoid probabilities
//   trainer.rs         — generic BCE training loop
//   inferencer.rs      — logits → Prediction rows
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

use burn::prelude::*;

pub mod encoder_block;

pub mod text_encoder;

pub mod text_head;

pub mod text_classifier;

pub mod binary_head;

pub mod tabular_model;

pub mod trainer;

pub mod inferencer;

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;
#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;

/// Training runs on the inference backend wrapped with autodiff.
pub type TrainBackend = burn::backend::Autodiff<InferBackend>;

/// A batch that carries 0/1 targets, one per row.
pub trait LabelledBatch<B: Backend> {
    fn labels(&self) -> Tensor<B, 1, Int>;
}

/// Any model producing one logit per row of a batch of type `T`.
///
/// This is the seam shared by `trainer::fit_binary` and
/// `inferencer::score`, so both pipelines reuse one loop.
pub trait BinaryClassifier<B: Backend, T> {
    /// Logits of shape [batch_size].
    fn forward_logits(&self, batch: &T) -> Tensor<B, 1>;
}

impl<B: Backend> LabelledBatch<B> for crate::data::text_batcher::TextBatch<B> {
    fn labels(&self) -> Tensor<B, 1, Int> {
        self.labels.clone()
    }
}

impl<B: Backend> LabelledBatch<B> for crate::data::tabular_batcher::TabularBatch<B> {
    fn labels(&self) -> Tensor<B, 1, Int> {
        self.labels.clone()
    }
}
