use burn::prelude::*;

use crate::data::text_batcher::TextBatch;
use crate::domain::error::PipelineError;
use crate::ml::{
    text_encoder::{TextEncoder, TextEncoderConfig},
    text_head::{TextClassifierHead, TextHeadConfig},
    BinaryClassifier,
};

#[derive(Config, Debug)]
pub struct TextClassifierConfig {
    pub encoder: TextEncoderConfig,
    pub head:    TextHeadConfig,
}

impl TextClassifierConfig {
    /// Reject architectures that would only fail later inside a matmul.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.head.d_input != self.encoder.d_model {
            return Err(PipelineError::ShapeMismatch {
                what:     "text head input vs encoder d_model",
                expected: self.encoder.d_model,
                actual:   self.head.d_input,
            });
        }
        if self.encoder.num_heads == 0 || self.encoder.d_model % self.encoder.num_heads != 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "d_model {} is not divisible by num_heads {}",
                self.encoder.d_model, self.encoder.num_heads
            )));
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> TextClassifier<B> {
        TextClassifier {
            encoder: self.encoder.init(device),
            head:    self.head.init(device),
        }
    }
}

/// Pipeline A: transcript encoder + feed-forward head.
#[derive(Module, Debug)]
pub struct TextClassifier<B: Backend> {
    pub encoder: TextEncoder<B>,
    pub head:    TextClassifierHead<B>,
}

impl<B: Backend> TextClassifier<B> {
    /// Wrap an already built (e.g. pretrained) encoder with a fresh head.
    pub fn with_encoder(
        encoder: TextEncoder<B>,
        head:    &TextHeadConfig,
        device:  &B::Device,
    ) -> Result<Self, PipelineError> {
        if head.d_input != encoder.d_model {
            return Err(PipelineError::ShapeMismatch {
                what:     "text head input vs encoder d_model",
                expected: encoder.d_model,
                actual:   head.d_input,
            });
        }
        Ok(Self { encoder, head: head.init(device) })
    }

    /// input_ids, attention_mask: [batch, seq_len] → logits: [batch]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>, attention_mask: Tensor<B, 2, Int>) -> Tensor<B, 1> {
        self.head.forward(self.encoder.forward(input_ids, attention_mask))
    }
}

impl<B: Backend> BinaryClassifier<B, TextBatch<B>> for TextClassifier<B> {
    fn forward_logits(&self, batch: &TextBatch<B>) -> Tensor<B, 1> {
        self.forward(batch.input_ids.clone(), batch.attention_mask.clone())
    }
}
