//! Tabular model: ordered named columns holding the loaded cell values.
//!
//! Values are kept exactly as loaded. Ordering goes through a polars key
//! frame built on demand for one column.

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, PlSmallStr, Series};

use crate::spec::{EnumCellValue, EnumKeyCompareMode, SortSheetError};
use crate::util::{
    convert_datetime_to_excel_serial, convert_integral_f64, derive_unique_column_names,
    render_cell_text,
};

/// Key column name inside a key frame.
pub(crate) const C_COL_KEY: &str = "key";
/// Original row position column name inside a key frame.
pub(crate) const C_COL_ROW_IDX: &str = "row_idx";

/// Value kind inferred for one column from its non-null values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumColumnKind {
    Empty,
    Integer,
    Number,
    Boolean,
    String,
    DateTime,
    Mixed,
}

impl EnumColumnKind {
    fn of(value: &EnumCellValue) -> Self {
        match value {
            EnumCellValue::None => Self::Empty,
            EnumCellValue::Integer(_) => Self::Integer,
            EnumCellValue::Number(n) => {
                if convert_integral_f64(*n).is_some() {
                    Self::Integer
                } else {
                    Self::Number
                }
            }
            EnumCellValue::Boolean(_) => Self::Boolean,
            EnumCellValue::String(_) => Self::String,
            EnumCellValue::DateTime(_) => Self::DateTime,
        }
    }

    fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Empty, k) | (k, Self::Empty) => k,
            (a, b) if a == b => a,
            (Self::Integer, Self::Number) | (Self::Number, Self::Integer) => Self::Number,
            _ => Self::Mixed,
        }
    }
}

/// Table of named columns; row order is significant.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetTable {
    l_colnames: Vec<String>,
    l_columns: Vec<Vec<EnumCellValue>>,
}

impl SpecSheetTable {
    /// Build a table from a header row and body rows.
    ///
    /// Header texts are normalized with [`derive_unique_column_names`]. Short
    /// rows are padded with nulls; the table width is the widest of header and
    /// rows.
    pub fn from_rows(
        headers: &[String],
        rows: &[Vec<EnumCellValue>],
    ) -> Result<Self, SortSheetError> {
        let n_width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0);

        let mut l_headers = headers.to_vec();
        l_headers.resize(n_width, String::new());
        let l_names = derive_unique_column_names(&l_headers);

        let mut l_columns: Vec<Vec<EnumCellValue>> = vec![Vec::with_capacity(rows.len()); n_width];
        for row in rows {
            for (n_idx_col, l_values) in l_columns.iter_mut().enumerate() {
                l_values.push(row.get(n_idx_col).cloned().unwrap_or(EnumCellValue::None));
            }
        }

        Self::from_columns(&l_names, l_columns)
    }

    /// Build a table from unique column names and per-column values.
    pub fn from_columns(
        names: &[String],
        columns: Vec<Vec<EnumCellValue>>,
    ) -> Result<Self, SortSheetError> {
        if names.len() != columns.len() {
            return Err(SortSheetError::Table(format!(
                "{} column names for {} columns",
                names.len(),
                columns.len()
            )));
        }
        let n_height = columns.first().map_or(0, Vec::len);
        if let Some((n_idx_col, l_values)) = columns
            .iter()
            .enumerate()
            .find(|(_, l_values)| l_values.len() != n_height)
        {
            return Err(SortSheetError::Table(format!(
                "column {n_idx_col} has {} values, expected {n_height}",
                l_values.len()
            )));
        }

        Ok(Self {
            l_colnames: names.to_vec(),
            l_columns: columns,
        })
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.l_colnames.clone()
    }

    /// Number of body rows.
    pub fn height(&self) -> usize {
        self.l_columns.first().map_or(0, Vec::len)
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.l_columns.len()
    }

    /// Value at zero-based `(row_idx, col_idx)`.
    pub fn value(&self, row_idx: usize, col_idx: usize) -> Result<EnumCellValue, SortSheetError> {
        let l_values = self.l_columns.get(col_idx).ok_or_else(|| {
            SortSheetError::Table(format!("column index out of range: {col_idx}"))
        })?;
        l_values
            .get(row_idx)
            .cloned()
            .ok_or_else(|| SortSheetError::Table(format!("row index out of range: {row_idx}")))
    }

    /// One body row as values in column order.
    pub fn row(&self, row_idx: usize) -> Result<Vec<EnumCellValue>, SortSheetError> {
        (0..self.width())
            .map(|n_idx_col| self.value(row_idx, n_idx_col))
            .collect()
    }

    /// All body rows in order.
    pub fn rows(&self) -> Result<Vec<Vec<EnumCellValue>>, SortSheetError> {
        (0..self.height()).map(|n_idx_row| self.row(n_idx_row)).collect()
    }

    /// All values of column `col_idx`, top to bottom.
    pub fn column_values(&self, col_idx: usize) -> Result<Vec<EnumCellValue>, SortSheetError> {
        self.l_columns
            .get(col_idx)
            .cloned()
            .ok_or_else(|| SortSheetError::Table(format!("column index out of range: {col_idx}")))
    }

    /// Two-column frame (`key`, `row_idx`) used to order rows by `col_idx`.
    ///
    /// The key is single-typed: integers, floats, Excel serials for
    /// date-times, booleans or text. A column mixing kinds is keyed by its
    /// rendered text and reported as [`EnumKeyCompareMode::Text`].
    pub(crate) fn derive_key_frame(
        &self,
        col_idx: usize,
    ) -> Result<(DataFrame, EnumKeyCompareMode), SortSheetError> {
        let l_values = self.l_columns.get(col_idx).ok_or_else(|| {
            SortSheetError::Table(format!("column index out of range: {col_idx}"))
        })?;
        let (col_key, rule_compare) = derive_key_column(l_values);
        let l_idx: Vec<i64> = (0..l_values.len() as i64).collect();
        let col_idx_row = Series::new(PlSmallStr::from(C_COL_ROW_IDX), l_idx).into_column();

        let df = DataFrame::new(vec![col_key, col_idx_row])
            .map_err(|err| SortSheetError::Table(err.to_string()))?;
        Ok((df, rule_compare))
    }

    /// New table whose rows are this table's rows at `indices`, in that order.
    pub(crate) fn take_rows(&self, indices: &[usize]) -> Result<Self, SortSheetError> {
        let n_height = self.height();
        if let Some(n_idx) = indices.iter().find(|n_idx| **n_idx >= n_height) {
            return Err(SortSheetError::Table(format!(
                "row index out of range: {n_idx} (height {n_height})"
            )));
        }
        let l_columns = self
            .l_columns
            .iter()
            .map(|l_values| indices.iter().map(|n_idx| l_values[*n_idx].clone()).collect())
            .collect();
        Ok(Self {
            l_colnames: self.l_colnames.clone(),
            l_columns,
        })
    }
}

fn derive_key_column(values: &[EnumCellValue]) -> (Column, EnumKeyCompareMode) {
    let rule_kind = values
        .iter()
        .map(EnumColumnKind::of)
        .fold(EnumColumnKind::Empty, EnumColumnKind::combine);
    let c_name = PlSmallStr::from(C_COL_KEY);

    match rule_kind {
        EnumColumnKind::Integer => {
            let l_keys: Vec<Option<i64>> = values
                .iter()
                .map(|value| match value {
                    EnumCellValue::Integer(n) => Some(*n),
                    EnumCellValue::Number(n) => convert_integral_f64(*n),
                    _ => None,
                })
                .collect();
            (Series::new(c_name, l_keys).into_column(), EnumKeyCompareMode::Native)
        }
        EnumColumnKind::Number => {
            let l_keys: Vec<Option<f64>> = values
                .iter()
                .map(|value| match value {
                    EnumCellValue::Integer(n) => Some(*n as f64),
                    EnumCellValue::Number(n) => Some(*n),
                    _ => None,
                })
                .collect();
            (Series::new(c_name, l_keys).into_column(), EnumKeyCompareMode::Native)
        }
        EnumColumnKind::DateTime => {
            let l_keys: Vec<Option<f64>> = values
                .iter()
                .map(|value| match value {
                    EnumCellValue::DateTime(dt) => Some(convert_datetime_to_excel_serial(dt)),
                    _ => None,
                })
                .collect();
            (Series::new(c_name, l_keys).into_column(), EnumKeyCompareMode::Native)
        }
        EnumColumnKind::Boolean => {
            let l_keys: Vec<Option<bool>> = values
                .iter()
                .map(|value| match value {
                    EnumCellValue::Boolean(b) => Some(*b),
                    _ => None,
                })
                .collect();
            (Series::new(c_name, l_keys).into_column(), EnumKeyCompareMode::Native)
        }
        EnumColumnKind::Empty | EnumColumnKind::String | EnumColumnKind::Mixed => {
            let l_keys: Vec<Option<String>> = values
                .iter()
                .map(|value| match value {
                    EnumCellValue::None => None,
                    _ => Some(render_cell_text(value)),
                })
                .collect();
            let rule_compare = if rule_kind == EnumColumnKind::Mixed {
                EnumKeyCompareMode::Text
            } else {
                EnumKeyCompareMode::Native
            };
            (Series::new(c_name, l_keys).into_column(), rule_compare)
        }
    }
}
