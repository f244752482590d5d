use burn::data::dataset::Dataset;

use crate::data::tabular_encoder::{EncodedRow, EncodedTable};

pub struct TabularDataset {
    rows: Vec<EncodedRow>,
}

impl TabularDataset {
    pub fn new(table: EncodedTable) -> Self {
        Self { rows: table.rows }
    }
}

impl Dataset<EncodedRow> for TabularDataset {
    fn get(&self, index: usize) -> Option<EncodedRow> {
        self.rows.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}
