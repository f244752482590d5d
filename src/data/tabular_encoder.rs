// ============================================================
// Layer 4 — Tabular Encoders
// ============================================================
// Fit once on the training rows, then frozen:
//
//   CategoricalEncoder — sorted vocabulary of the column's values;
//                        a value's index is its position. Values not
//                        seen at fit time are a hard error.
//   ContinuousScaler   — mean and population standard deviation;
//                        transform(x) = (x - mean) / std. A constant
//                        column scales by 1.0.
//   TabularEncoder     — one of the above per schema column, plus the
//                        row → EncodedRow transform.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::domain::error::PipelineError;
use crate::domain::record::{CellValue, TabularRow, TabularSchema};

#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    column:  String,
    classes: Vec<String>,
    index:   HashMap<String, usize>,
}

impl CategoricalEncoder {
    pub fn fit<'a, I>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = &'a CellValue>,
    {
        let classes: Vec<String> = values
            .into_iter()
            .map(CellValue::category_key)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index = classes.iter().enumerate().map(|(i, c)| (c.clone(), i)).collect();
        Self { column: column.into(), classes, index }
    }

    pub fn transform(&self, value: &CellValue) -> Result<usize, PipelineError> {
        let key = value.category_key();
        self.index.get(&key).copied().ok_or_else(|| PipelineError::UnseenCategory {
            column: self.column.clone(),
            value:  key,
        })
    }

    /// Number of rows the embedding table for this column needs.
    pub fn cardinality(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContinuousScaler {
    pub mean: f64,
    pub std:  f64,
}

impl ContinuousScaler {
    pub fn fit(values: &[f64]) -> Result<Self, PipelineError> {
        if values.is_empty() {
            return Err(PipelineError::EmptyDataset("fit a continuous scaler"));
        }
        let n    = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var  = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std  = var.sqrt();
        Ok(Self { mean, std: if std > 0.0 { std } else { 1.0 } })
    }

    pub fn transform(&self, value: f64) -> f32 {
        ((value - self.mean) / self.std) as f32
    }
}

/// One customer row after encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedRow {
    pub categorical: Vec<usize>,
    pub continuous:  Vec<f32>,
    pub label:       u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTable {
    pub rows:            Vec<EncodedRow>,
    pub num_categorical: usize,
    pub num_continuous:  usize,
}

impl EncodedTable {
    /// (rows, categorical columns)
    pub fn categorical_shape(&self) -> (usize, usize) {
        (self.rows.len(), self.num_categorical)
    }

    /// (rows, continuous columns)
    pub fn continuous_shape(&self) -> (usize, usize) {
        (self.rows.len(), self.num_continuous)
    }
}

#[derive(Debug, Clone)]
pub struct TabularEncoder {
    schema:      TabularSchema,
    categorical: Vec<CategoricalEncoder>,
    continuous:  Vec<ContinuousScaler>,
}

impl TabularEncoder {
    pub fn fit(schema: TabularSchema, rows: &[TabularRow]) -> Result<Self, PipelineError> {
        if rows.is_empty() {
            return Err(PipelineError::EmptyDataset("fit a tabular encoder"));
        }
        if schema.num_categorical() + schema.num_continuous() == 0 {
            return Err(PipelineError::InvalidConfig("schema has no feature columns".into()));
        }

        let mut categorical = Vec::with_capacity(schema.num_categorical());
        for column in &schema.categorical {
            let values = rows
                .iter()
                .enumerate()
                .map(|(i, r)| cell(r, i, column))
                .collect::<Result<Vec<_>, _>>()?;
            categorical.push(CategoricalEncoder::fit(column.clone(), values));
        }

        let mut continuous = Vec::with_capacity(schema.num_continuous());
        for column in &schema.continuous {
            let values = rows
                .iter()
                .enumerate()
                .map(|(i, r)| number(r, i, column))
                .collect::<Result<Vec<_>, _>>()?;
            continuous.push(ContinuousScaler::fit(&values)?);
        }

        tracing::debug!(
            "Fitted tabular encoder: cardinalities={:?}",
            categorical.iter().map(CategoricalEncoder::cardinality).collect::<Vec<_>>()
        );

        Ok(Self { schema, categorical, continuous })
    }

    pub fn transform_row(&self, row: &TabularRow, index: usize) -> Result<EncodedRow, PipelineError> {
        let categorical = self.schema.categorical
            .iter()
            .zip(&self.categorical)
            .map(|(column, enc)| enc.transform(cell(row, index, column)?))
            .collect::<Result<Vec<_>, _>>()?;

        let continuous = self.schema.continuous
            .iter()
            .zip(&self.continuous)
            .map(|(column, scaler)| Ok(scaler.transform(number(row, index, column)?)))
            .collect::<Result<Vec<_>, PipelineError>>()?;

        Ok(EncodedRow { categorical, continuous, label: row.label })
    }

    pub fn transform(&self, rows: &[TabularRow]) -> Result<EncodedTable, PipelineError> {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, r)| self.transform_row(r, i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EncodedTable {
            rows,
            num_categorical: self.schema.num_categorical(),
            num_continuous:  self.schema.num_continuous(),
        })
    }

    /// Embedding table sizes, in schema order.
    pub fn cardinalities(&self) -> Vec<usize> {
        self.categorical.iter().map(CategoricalEncoder::cardinality).collect()
    }
}

fn cell<'a>(row: &'a TabularRow, index: usize, column: &str) -> Result<&'a CellValue, PipelineError> {
    row.get(column).ok_or_else(|| PipelineError::MissingColumn {
        row:    index,
        column: column.to_string(),
    })
}

fn number(row: &TabularRow, index: usize, column: &str) -> Result<f64, PipelineError> {
    cell(row, index, column)?
        .as_number()
        .ok_or_else(|| PipelineError::TypeMismatch { row: index, column: column.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::records::BundledCustomers;
    use crate::domain::traits::RecordSource;

    fn fitted() -> (TabularEncoder, Vec<TabularRow>) {
        let rows = BundledCustomers.load_all().unwrap();
        let enc  = TabularEncoder::fit(BundledCustomers::schema(), &rows).unwrap();
        (enc, rows)
    }

    #[test]
    fn test_example_dataset_shapes() {
        let (enc, rows) = fitted();
        let table = enc.transform(&rows).unwrap();
        assert_eq!(table.categorical_shape(), (5, 2));
        assert_eq!(table.continuous_shape(), (5, 2));
        assert_eq!(enc.cardinalities(), vec![2, 4]);
    }

    #[test]
    fn test_categories_are_sorted() {
        let values = [CellValue::from("west"), CellValue::from("east"), CellValue::from("west")];
        let enc    = CategoricalEncoder::fit("region", values.iter());
        assert_eq!(enc.classes(), ["east", "west"]);
        assert_eq!(enc.transform(&CellValue::from("west")), Ok(1));
    }

    #[test]
    fn test_unseen_category_fails() {
        let (enc, _) = fitted();
        let row = TabularRow::new(
            [
                ("gender", CellValue::from("female")),
                ("region", CellValue::from("antarctica")),
                ("age",    CellValue::from(30.0)),
                ("income", CellValue::from(1.0)),
            ],
            0,
        );
        assert_eq!(
            enc.transform(&[row]),
            Err(PipelineError::UnseenCategory {
                column: "region".into(),
                value:  "antarctica".into(),
            })
        );
    }

    #[test]
    fn test_missing_and_mistyped_columns() {
        let (enc, _) = fitted();
        let missing = TabularRow::new([("gender", CellValue::from("male"))], 0);
        assert!(matches!(
            enc.transform_row(&missing, 0),
            Err(PipelineError::MissingColumn { .. })
        ));

        let mistyped = TabularRow::new(
            [
                ("gender", CellValue::from("male")),
                ("region", CellValue::from("north")),
                ("age",    CellValue::from("old")),
                ("income", CellValue::from(1.0)),
            ],
            0,
        );
        assert_eq!(
            enc.transform_row(&mistyped, 3),
            Err(PipelineError::TypeMismatch { row: 3, column: "age".into() })
        );
    }

    #[test]
    fn test_scaler_standardises() {
        let s = ContinuousScaler::fit(&[25.0, 30.0, 35.0, 40.0, 45.0]).unwrap();
        assert_eq!(s.mean, 35.0);
        assert!((s.transform(35.0)).abs() < 1e-6);
        assert!((s.transform(45.0) - 1.414_213_5).abs() < 1e-5);
    }

    #[test]
    fn test_constant_column_scales_by_one() {
        let s = ContinuousScaler::fit(&[7.0, 7.0]).unwrap();
        assert_eq!(s.std, 1.0);
        assert_eq!(s.transform(8.0), 1.0);
    }

    #[test]
    fn test_identical_rows_encode_identically() {
        let (enc, rows) = fitted();
        let a = enc.transform_row(&rows[0], 0).unwrap();
        let b = enc.transform_row(&rows[0].clone(), 1).unwrap();
        assert_eq!(a, b);
    }
}
