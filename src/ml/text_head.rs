use burn::{
    nn::{Dropout, DropoutConfig, Linear, LinearConfig},
    prelude::*,
};

use crate::domain::error::PipelineError;

#[derive(Config, Debug)]
pub struct TextHeadConfig {
    /// Width of the pooled representation; must equal the encoder's d_model.
    pub d_input:  usize,
    #[config(default = 256)]
    pub hidden_1: usize,
    #[config(default = 64)]
    pub hidden_2: usize,
    #[config(default = 0.1)]
    pub dropout:  f64,
}

impl TextHeadConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TextClassifierHead<B> {
        TextClassifierHead {
            linear1: LinearConfig::new(self.d_input, self.hidden_1).init(device),
            linear2: LinearConfig::new(self.hidden_1, self.hidden_2).init(device),
            output:  LinearConfig::new(self.hidden_2, 1).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            d_input: self.d_input,
        }
    }
}

/// pooled → Linear → tanh → dropout → Linear → tanh → dropout → Linear → logit
#[derive(Module, Debug)]
pub struct TextClassifierHead<B: Backend> {
    pub linear1: Linear<B>,
    pub linear2: Linear<B>,
    pub output:  Linear<B>,
    pub dropout: Dropout,
    pub d_input: usize,
}

impl<B: Backend> TextClassifierHead<B> {
    /// pooled: [batch, d_input] → logits: [batch]
    pub fn forward(&self, pooled: Tensor<B, 2>) -> Tensor<B, 1> {
        let [batch_size, _] = pooled.dims();
        let x = self.dropout.forward(self.linear1.forward(pooled).tanh());
        let x = self.dropout.forward(self.linear2.forward(x).tanh());
        self.output.forward(x).reshape([batch_size])
    }

    /// Like `forward`, but reports a width mismatch instead of panicking
    /// inside the matmul.
    pub fn try_forward(&self, pooled: Tensor<B, 2>) -> Result<Tensor<B, 1>, PipelineError> {
        let [_, width] = pooled.dims();
        if width != self.d_input {
            return Err(PipelineError::ShapeMismatch {
                what:     "text head input",
                expected: self.d_input,
                actual:   width,
            });
        }
        Ok(self.forward(pooled))
    }
}
