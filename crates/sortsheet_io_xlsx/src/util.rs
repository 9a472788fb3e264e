//! Stateless helper utilities shared by the loader, formatter and writer.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::conf::{
    C_FILE_OUT_SUFFIX, C_FMT_DATETIME_TEXT, N_DAYS_CE_EXCEL_EPOCH, N_LEN_EXCEL_SHEET_NAME_MAX,
    TUP_EXCEL_ILLEGAL,
};
use crate::spec::EnumCellValue;

////////////////////////////////////////////////////////////////////////////////
// #region CellValueRendering

/// Render a cell value to the text used for width measurement and previews.
pub fn render_cell_text(value: &EnumCellValue) -> String {
    match value {
        EnumCellValue::None => String::new(),
        EnumCellValue::String(s) => s.clone(),
        EnumCellValue::Number(n) => n.to_string(),
        EnumCellValue::Integer(n) => n.to_string(),
        EnumCellValue::Boolean(b) => if *b { "True" } else { "False" }.to_string(),
        EnumCellValue::DateTime(dt) => dt.format(C_FMT_DATETIME_TEXT).to_string(),
    }
}

/// Character count of [`render_cell_text`]; `None` measures 0.
pub fn measure_cell_text(value: &EnumCellValue) -> usize {
    match value {
        EnumCellValue::None => 0,
        EnumCellValue::String(s) => s.chars().count(),
        _ => render_cell_text(value).chars().count(),
    }
}

/// Convert an integral finite float into `i64` when it is exactly representable.
pub fn convert_integral_f64(x: f64) -> Option<i64> {
    if !x.is_finite() || x.fract() != 0.0 {
        return None;
    }
    // 2^63 is exactly representable, i64::MAX is not.
    if x < -9_223_372_036_854_775_808.0 || x >= 9_223_372_036_854_775_808.0 {
        return None;
    }
    Some(x as i64)
}

/// Excel serial number (1900 date system) of a date-time.
///
/// Serials below 61 are shifted by one day to match Excel's phantom
/// 1900-02-29.
pub fn convert_datetime_to_excel_serial(dt: &NaiveDateTime) -> f64 {
    let n_days = (dt.date().num_days_from_ce() - N_DAYS_CE_EXCEL_EPOCH) as f64;
    let n_secs = dt.time().num_seconds_from_midnight() as f64
        + dt.time().nanosecond() as f64 / 1e9;
    let n_serial = n_days + n_secs / 86_400.0;
    if n_serial < 61.0 {
        n_serial - 1.0
    } else {
        n_serial
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnNames

/// Normalize raw header texts into unique, non-empty column names.
///
/// Empty header at position `i` becomes `Unnamed: i`; repeated names get
/// `.1`, `.2`, ... suffixes in first-seen order.
pub fn derive_unique_column_names(headers: &[String]) -> Vec<String> {
    let l_names_base: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(n_idx, c_name)| {
            if c_name.trim().is_empty() {
                format!("Unnamed: {n_idx}")
            } else {
                c_name.clone()
            }
        })
        .collect();

    let mut set_names_taken: BTreeSet<String> = BTreeSet::new();
    let mut l_names = Vec::with_capacity(l_names_base.len());
    for c_name in l_names_base {
        if set_names_taken.insert(c_name.clone()) {
            l_names.push(c_name);
            continue;
        }

        let mut n_suffix = 1usize;
        loop {
            let c_candidate = format!("{c_name}.{n_suffix}");
            if set_names_taken.insert(c_candidate.clone()) {
                l_names.push(c_candidate);
                break;
            }
            n_suffix += 1;
        }
    }
    l_names
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Paths

/// Derive `<stem>_sapxep_cotE.xlsx` next to `path_file_in`.
pub fn derive_output_path(path_file_in: &Path) -> PathBuf {
    let c_stem = path_file_in
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    path_file_in.with_file_name(format!("{c_stem}{C_FILE_OUT_SUFFIX}.xlsx"))
}

/// Lower-cased extension of a file name, if any.
pub fn derive_extension_lower(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Casts

/// Cast zero-based row index to the xlsx writer row type.
pub fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

/// Cast zero-based column index to the xlsx writer column type.
pub fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
