// ============================================================
// Layer 4 — Customer Row Batcher
// ============================================================
//   Vec<EncodedRow> (N rows, C categorical, K continuous)
//     → TabularBatch { categorical [N, C] Int,
//                      continuous  [N, K] Float,
//                      labels      [N]    Int }
//
// C or K may be zero; the tensors then have an empty second
// dimension and the embedder skips that branch.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::tabular_encoder::EncodedRow;

#[derive(Debug, Clone)]
pub struct TabularBatch<B: Backend> {
    pub categorical: Tensor<B, 2, Int>,
    pub continuous:  Tensor<B, 2>,
    pub labels:      Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct TabularBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TabularBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<EncodedRow, TabularBatch<B>> for TabularBatcher<B> {
    fn batch(&self, items: Vec<EncodedRow>) -> TabularBatch<B> {
        let batch_size = items.len();
        let n_cat      = items.first().map_or(0, |r| r.categorical.len());
        let n_cont     = items.first().map_or(0, |r| r.continuous.len());

        let cat_flat: Vec<i32> = items
            .iter()
            .flat_map(|r| r.categorical.iter().map(|&i| i as i32))
            .collect();

        let cont_flat: Vec<f32> = items
            .iter()
            .flat_map(|r| r.continuous.iter().copied())
            .collect();

        let labels: Vec<i32> = items.iter().map(|r| r.label as i32).collect();

        let categorical = Tensor::<B, 1, Int>::from_ints(cat_flat.as_slice(), &self.device)
            .reshape([batch_size, n_cat]);

        let continuous = Tensor::<B, 1>::from_floats(cont_flat.as_slice(), &self.device)
            .reshape([batch_size, n_cont]);

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        TabularBatch { categorical, continuous, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::records::BundledCustomers;
    use crate::data::tabular_encoder::TabularEncoder;
    use crate::domain::traits::RecordSource;
    use burn::backend::NdArray;

    #[test]
    fn test_example_batch_shapes() {
        let rows  = BundledCustomers.load_all().unwrap();
        let enc   = TabularEncoder::fit(BundledCustomers::schema(), &rows).unwrap();
        let table = enc.transform(&rows).unwrap();

        let batch = TabularBatcher::<NdArray>::new(Default::default()).batch(table.rows);
        assert_eq!(batch.categorical.dims(), [5, 2]);
        assert_eq!(batch.continuous.dims(), [5, 2]);
        assert_eq!(batch.labels.dims(), [5]);
    }
}
