//! Sort/format constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::SpecCellFormat;

/// Zero-based index of the sort key column ("column E").
///
/// Column identity is positional: whatever the header says, the fifth
/// column is the key.
pub const N_IDX_COL_SORT_KEY: usize = 4;
/// Spreadsheet letter of [`N_IDX_COL_SORT_KEY`].
pub const C_COL_SORT_KEY_LETTER: &str = "E";
/// Fixed padding added to the widest rendered cell of a column.
pub const N_WIDTH_CELL_PADDING: usize = 2;

/// Largest integer magnitude an `f64` number cell holds exactly (2^53).
pub const N_ABS_INTEGER_EXACT_F64_MAX: i64 = 9_007_199_254_740_992;
/// `num_days_from_ce` of 1899-12-30, day zero of Excel's 1900 date system.
pub const N_DAYS_CE_EXCEL_EPOCH: i32 = 693_594;
/// Text form of date-time values (previews and width measurement).
pub const C_FMT_DATETIME_TEXT: &str = "%Y-%m-%d %H:%M:%S";
/// Number format written on date-time cells.
pub const C_NUM_FORMAT_DATETIME: &str = "yyyy-mm-dd hh:mm:ss";

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel maximum column width in character units.
pub const N_WIDTH_EXCEL_COLUMN_MAX: f64 = 255.0;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Sheet name used for the sorted output workbook.
pub const C_SHEET_NAME_OUTPUT: &str = "Sheet1";
/// Input path used by the batch surface when none is given.
pub const C_FILE_IN_DEFAULT: &str = "tonghop.xlsx";
/// Suffix appended to the input stem to derive the output name.
pub const C_FILE_OUT_SUFFIX: &str = "_sapxep_cotE";
/// File name offered for download by the interactive surface.
pub const C_FILE_OUT_DOWNLOAD: &str = "tonghop_sapxep_cotE.xlsx";
/// Upload extensions accepted by the interactive surface.
pub const TUP_EXT_UPLOAD_ACCEPTED: [&str; 3] = ["xlsx", "xlsm", "xls"];
/// MIME type of the produced workbook.
pub const C_MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFmtKey {
    /// Body cell format.
    Body,
    /// Header cell format.
    Header,
    /// Patch merged onto body cells holding date-time values.
    Datetime,
}

impl EnumFmtKey {
    /// Preset map key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Header => "header",
            Self::Datetime => "datetime",
        }
    }
}

/// Build default named format presets used by [`crate::document`].
///
/// The header preset matches what a DataFrame-to-Excel export emits for its
/// header row (bold, thin border, centered); body cells carry no format until
/// the formatter runs.
pub fn derive_default_document_formats() -> BTreeMap<String, SpecCellFormat> {
    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(EnumFmtKey::Body.as_str().to_string(), SpecCellFormat::default());
    dict_fmt.insert(
        EnumFmtKey::Header.as_str().to_string(),
        SpecCellFormat {
            bold: Some(true),
            border: Some(1),
            align: Some("center".to_string()),
            valign: Some("top".to_string()),
            ..Default::default()
        },
    );
    dict_fmt.insert(
        EnumFmtKey::Datetime.as_str().to_string(),
        SpecCellFormat {
            num_format: Some(C_NUM_FORMAT_DATETIME.to_string()),
            ..Default::default()
        },
    );
    dict_fmt
}

/// Format patch the formatter overlays on every cell.
pub fn derive_autofit_alignment_patch() -> SpecCellFormat {
    SpecCellFormat {
        align: Some("left".to_string()),
        valign: Some("vcenter".to_string()),
        text_wrap: Some(true),
        ..Default::default()
    }
}
