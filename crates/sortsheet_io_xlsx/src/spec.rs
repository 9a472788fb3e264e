//! Shared specification models, options and errors.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification (xlsxwriter-style property names).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Number format code.
    pub num_format: Option<String>,
}

impl SpecCellFormat {
    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
        }
    }

    /// `true` when no property is set.
    pub fn is_empty(&self) -> bool {
        *self == SpecCellFormat::default()
    }
}

/// Scalar cell value carried through load, sort, document and write stages.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Floating-point numeric value.
    Number(f64),
    /// Integral numeric value.
    Integer(i64),
    /// Boolean value.
    Boolean(bool),
    /// Calendar date and time of day.
    DateTime(NaiveDateTime),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DocumentSpecification

/// One cell of a [`SpecSheetDocument`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpecDocumentCell {
    /// Cell value.
    pub value: EnumCellValue,
    /// Cell style.
    pub format: SpecCellFormat,
}

/// One column of a [`SpecSheetDocument`]; `cells[0]` is the header cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecDocumentColumn {
    /// Column width in character units; `None` keeps the application default.
    pub width: Option<f64>,
    /// Cells from top to bottom.
    pub cells: Vec<SpecDocumentCell>,
}

/// In-memory single-sheet workbook, addressed by (column, row).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetDocument {
    /// Worksheet name.
    pub sheet_name: String,
    /// Columns from left to right.
    pub columns: Vec<SpecDocumentColumn>,
}

impl SpecSheetDocument {
    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows (header included) of the tallest column.
    pub fn height(&self) -> usize {
        self.columns
            .iter()
            .map(|col| col.cells.len())
            .max()
            .unwrap_or(0)
    }

    /// Cell at zero-based `(col_idx, row_idx)`, if present.
    pub fn cell(&self, col_idx: usize, row_idx: usize) -> Option<&SpecDocumentCell> {
        self.columns.get(col_idx)?.cells.get(row_idx)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// How sort key values were compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumKeyCompareMode {
    /// Natural ordering of a single-typed column.
    #[default]
    Native,
    /// Mixed-type column compared by rendered text.
    Text,
}

impl fmt::Display for EnumKeyCompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Per-run sort report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecSortReport {
    /// Body row count.
    pub n_rows: usize,
    /// Column count.
    pub n_cols: usize,
    /// Header text of the key column.
    pub sort_column_name: String,
    /// Comparison mode used for the key column.
    pub rule_compare: EnumKeyCompareMode,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecSortReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} rows={} cols={} key={:?} compare={} warnings={}",
            self.n_rows,
            self.n_cols,
            self.sort_column_name,
            self.rule_compare,
            self.warnings.len()
        )
    }
}

impl fmt::Display for SpecSortReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[SORT]"))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Top-level pipeline failure.
#[derive(Debug)]
pub enum SortSheetError {
    /// Input bytes/file are not a readable spreadsheet.
    Format(String),
    /// Table has too few columns to identify the sort key column.
    Schema {
        /// Column count of the rejected table.
        n_cols: usize,
    },
    /// Output could not be encoded or written.
    Write {
        /// Target path; `None` for the in-memory sink.
        path: Option<PathBuf>,
        /// Underlying error text.
        message: String,
    },
    /// Unexpected failure in a table operation.
    Table(String),
}

impl fmt::Display for SortSheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(msg) => write!(f, "Cannot read spreadsheet: {msg}"),
            Self::Schema { n_cols } => write!(
                f,
                "table does not have enough columns to identify column E (found {n_cols}, need at least 5)"
            ),
            Self::Write {
                path: Some(path),
                message,
            } => write!(f, "Failed to write {}: {message}", path.display()),
            Self::Write {
                path: None,
                message,
            } => write!(f, "Failed to encode workbook: {message}"),
            Self::Table(msg) => write!(f, "Table operation failed: {msg}"),
        }
    }
}

impl std::error::Error for SortSheetError {}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overlays_only_set_fields() {
        let fmt_base = SpecCellFormat {
            bold: Some(true),
            align: Some("center".to_string()),
            ..Default::default()
        };
        let fmt_merged = fmt_base.merge(&SpecCellFormat {
            align: Some("left".to_string()),
            text_wrap: Some(true),
            ..Default::default()
        });

        assert_eq!(fmt_merged.bold, Some(true));
        assert_eq!(fmt_merged.align.as_deref(), Some("left"));
        assert_eq!(fmt_merged.text_wrap, Some(true));
        assert!(SpecCellFormat::default().is_empty());
        assert!(!fmt_merged.is_empty());
    }

    #[test]
    fn test_report_format_matches_display() {
        let mut report = SpecSortReport {
            n_rows: 3,
            n_cols: 5,
            sort_column_name: "Score".to_string(),
            rule_compare: EnumKeyCompareMode::Text,
            warnings: vec![],
        };
        report.warn("w");

        let txt = report.format("[SORT]");
        assert_eq!(
            txt,
            "[SORT] rows=3 cols=5 key=\"Score\" compare=text warnings=1"
        );
        assert_eq!(report.to_string(), txt);
    }

    #[test]
    fn test_schema_error_message_names_column_e() {
        let err = SortSheetError::Schema { n_cols: 4 };
        assert!(
            err.to_string()
                .starts_with("table does not have enough columns to identify column E")
        );
    }
}
