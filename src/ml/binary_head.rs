use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::activation::sigmoid,
};

/// Linear projection to a single logit.
#[derive(Module, Debug)]
pub struct BinaryHead<B: Backend> {
    pub linear: Linear<B>,
}

impl<B: Backend> BinaryHead<B> {
    pub fn new(d_input: usize, device: &B::Device) -> Self {
        Self { linear: LinearConfig::new(d_input, 1).init(device) }
    }

    /// x: [batch, d_input] → logits: [batch]
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 1> {
        let [batch_size, _] = x.dims();
        self.linear.forward(x).reshape([batch_size])
    }

    /// Probabilities in [0, 1]: [batch]
    pub fn probabilities(&self, x: Tensor<B, 2>) -> Tensor<B, 1> {
        sigmoid(self.forward(x))
    }
}
