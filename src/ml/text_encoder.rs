use burn::{
    nn::{
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
    },
    prelude::*,
};

use crate::ml::encoder_block::{EncoderBlock, EncoderBlockConfig};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct TextEncoderConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    #[config(default = 0.1)]
    pub dropout:     f64,
}

impl TextEncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TextEncoder<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let block_cfg = EncoderBlockConfig::new(self.d_model, self.num_heads, self.d_ff)
            .with_dropout(self.dropout);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| block_cfg.init(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        TextEncoder {
            token_embedding, position_embedding, layers, final_norm, dropout,
            max_seq_len: self.max_seq_len,
            d_model:     self.d_model,
        }
    }
}

/// Transcript encoder producing one pooled vector per sequence.
#[derive(Module, Debug)]
pub struct TextEncoder<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub dropout:            Dropout,
    pub max_seq_len:        usize,
    pub d_model:            usize,
}

impl<B: Backend> TextEncoder<B> {
    /// input_ids, attention_mask: [batch, seq_len] → [batch, seq_len, d_model]
    ///
    /// seq_len must not exceed max_seq_len.
    pub fn forward_hidden(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 3> {
        let [batch_size, seq_len] = input_ids.dims();

        let tok_emb = self.token_embedding.forward(input_ids);
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let mask_pad = attention_mask.equal_elem(0);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x, Some(mask_pad.clone()));
        }
        self.final_norm.forward(x)
    }

    /// Pooled representation taken from position 0 ([CLS]): [batch, d_model]
    pub fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        let hidden = self.forward_hidden(input_ids, attention_mask);
        let [batch_size, _, d_model] = hidden.dims();
        hidden
            .slice([0..batch_size, 0..1, 0..d_model])
            .reshape([batch_size, d_model])
    }
}
