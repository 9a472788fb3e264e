//! XLSX sink that encodes a [`SpecSheetDocument`] into workbook bytes.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use tempfile::NamedTempFile;

use crate::conf::{
    N_ABS_INTEGER_EXACT_F64_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, N_WIDTH_EXCEL_COLUMN_MAX,
};
use crate::spec::{EnumCellValue, SortSheetError, SpecCellFormat, SpecSheetDocument};
use crate::util::{
    cast_col_num, cast_row_num, convert_datetime_to_excel_serial, sanitize_sheet_name,
};

/// Buffer sink: encode `document` as a single-sheet `.xlsx` in memory.
pub fn save_document_to_buffer(document: &SpecSheetDocument) -> Result<Vec<u8>, SortSheetError> {
    encode_document(document).map_err(|message| SortSheetError::Write {
        path: None,
        message,
    })
}

/// File sink: write `document` to `path`, replacing any existing file.
///
/// The workbook is encoded in memory, written to a temporary file in the
/// destination directory and renamed over `path`. On failure the target is
/// left as it was.
pub fn save_document_to_path(
    document: &SpecSheetDocument,
    path: &Path,
) -> Result<(), SortSheetError> {
    let map_err = |message: String| SortSheetError::Write {
        path: Some(path.to_path_buf()),
        message,
    };

    let v_bytes = encode_document(document).map_err(map_err)?;
    persist_bytes(&v_bytes, path).map_err(map_err)?;

    log::debug!("Saved {} bytes to {}", v_bytes.len(), path.display());
    Ok(())
}

/// Encode `document` as the only worksheet of a new workbook.
///
/// Each distinct cell format becomes one `Format`; widths above the Excel
/// maximum are clamped.
fn encode_document(document: &SpecSheetDocument) -> Result<Vec<u8>, String> {
    let n_height = document.height();
    let n_width = document.width();
    if n_height > N_NROWS_EXCEL_MAX || n_width > N_NCOLS_EXCEL_MAX {
        return Err(format!(
            "document of {n_height} rows x {n_width} columns exceeds Excel limits \
             ({N_NROWS_EXCEL_MAX} x {N_NCOLS_EXCEL_MAX})"
        ));
    }

    let mut workbook = Workbook::new();
    let mut dict_formats: HashMap<SpecCellFormat, Format> = HashMap::new();
    let sheet_name = sanitize_sheet_name(&document.sheet_name, "_");
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name.as_str())
        .map_err(derive_xlsx_error_text)?;

    for (n_idx_col, col) in document.columns.iter().enumerate() {
        for (n_idx_row, cell) in col.cells.iter().enumerate() {
            let format = dict_formats
                .entry(cell.format.clone())
                .or_insert_with(|| derive_rust_xlsx_format(&cell.format));
            write_cell_with_format(worksheet, n_idx_row, n_idx_col, &cell.value, format)?;
        }
        if let Some(width) = col.width {
            worksheet
                .set_column_width(
                    cast_col_num(n_idx_col)?,
                    width.clamp(0.0, N_WIDTH_EXCEL_COLUMN_MAX),
                )
                .map_err(derive_xlsx_error_text)?;
        }
    }

    log::debug!(
        "Encoded sheet {sheet_name:?}: {n_height} rows x {n_width} columns, {} distinct formats",
        dict_formats.len()
    );
    workbook.save_to_buffer().map_err(derive_xlsx_error_text)
}

fn persist_bytes(bytes: &[u8], path: &Path) -> Result<(), String> {
    let path_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut file_tmp = NamedTempFile::new_in(&path_dir)
        .map_err(|err| format!("cannot create temp file in {}: {err}", path_dir.display()))?;
    file_tmp
        .write_all(bytes)
        .and_then(|_| file_tmp.flush())
        .and_then(|_| file_tmp.as_file().sync_all())
        .map_err(|err| err.to_string())?;
    file_tmp
        .persist(path)
        .map_err(|err| err.error.to_string())?;
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), String> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;
    match value {
        EnumCellValue::None => {
            worksheet
                .write_blank(n_row, n_col, format)
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::String(val) => {
            worksheet
                .write_string_with_format(n_row, n_col, val, format)
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::Number(val) => {
            worksheet
                .write_number_with_format(n_row, n_col, *val, format)
                .map_err(derive_xlsx_error_text)?;
        }
        // beyond 2^53 an f64 cell would round the value
        EnumCellValue::Integer(val)
            if val.unsigned_abs() > N_ABS_INTEGER_EXACT_F64_MAX.unsigned_abs() =>
        {
            worksheet
                .write_string_with_format(n_row, n_col, val.to_string(), format)
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::Integer(val) => {
            worksheet
                .write_number_with_format(n_row, n_col, *val as f64, format)
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::DateTime(val) => {
            worksheet
                .write_number_with_format(
                    n_row,
                    n_col,
                    convert_datetime_to_excel_serial(val),
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet
                .write_boolean_with_format(n_row, n_col, *val, format)
                .map_err(derive_xlsx_error_text)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    for val in [&spec.align, &spec.valign].into_iter().flatten() {
        if let Some(align) = derive_format_align(val) {
            format = format.set_align(align);
        }
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "top" => Some(FormatAlign::Top),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn derive_xlsx_error_text(err: XlsxError) -> String {
    format!("xlsx write error: {err}")
}

#[cfg(test)]
mod tests {
    use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
    use std::io::Cursor;

    use super::*;
    use crate::spec::{SpecDocumentCell, SpecDocumentColumn};

    fn build_document(sheet_name: &str) -> SpecSheetDocument {
        let fmt_wrap = SpecCellFormat {
            align: Some("left".to_string()),
            valign: Some("vcenter".to_string()),
            text_wrap: Some(true),
            ..Default::default()
        };
        let cell = |value: EnumCellValue| SpecDocumentCell {
            value,
            format: fmt_wrap.clone(),
        };
        SpecSheetDocument {
            sheet_name: sheet_name.to_string(),
            columns: vec![
                SpecDocumentColumn {
                    width: Some(6.0),
                    cells: vec![
                        cell(EnumCellValue::String("name".to_string())),
                        cell(EnumCellValue::String("y".to_string())),
                        cell(EnumCellValue::None),
                    ],
                },
                SpecDocumentColumn {
                    width: Some(400.0),
                    cells: vec![
                        cell(EnumCellValue::String("score".to_string())),
                        cell(EnumCellValue::Integer(10)),
                        cell(EnumCellValue::Number(2.5)),
                    ],
                },
                SpecDocumentColumn {
                    width: None,
                    cells: vec![
                        cell(EnumCellValue::String("flag".to_string())),
                        cell(EnumCellValue::Boolean(true)),
                    ],
                },
            ],
        }
    }

    fn read_sheet(bytes: Vec<u8>) -> (Vec<String>, calamine::Range<Data>) {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        let l_names = workbook.sheet_names();
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();
        (l_names, range)
    }

    #[test]
    fn test_buffer_sink_round_trips_values() {
        let bytes = save_document_to_buffer(&build_document("Sheet1")).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let (l_names, range) = read_sheet(bytes);
        assert_eq!(l_names, vec!["Sheet1"]);
        assert_eq!(range.get_size(), (3, 3));
        assert_eq!(range.get_value((0, 1)), Some(&Data::String("score".to_string())));
        assert_eq!(range.get_value((1, 1)), Some(&Data::Float(10.0)));
        assert_eq!(range.get_value((2, 1)), Some(&Data::Float(2.5)));
        assert_eq!(range.get_value((1, 2)), Some(&Data::Bool(true)));
        assert_eq!(range.get_value((2, 0)), Some(&Data::Empty));
    }

    #[test]
    fn test_sheet_name_is_sanitized() {
        let bytes = save_document_to_buffer(&build_document("a/b:c")).unwrap();
        let (l_names, _) = read_sheet(bytes);
        assert_eq!(l_names, vec!["a_b_c"]);
    }

    #[test]
    fn test_large_integers_are_written_as_text() {
        let cell = |value: EnumCellValue| SpecDocumentCell {
            value,
            format: SpecCellFormat::default(),
        };
        let document = SpecSheetDocument {
            sheet_name: "Sheet1".to_string(),
            columns: vec![SpecDocumentColumn {
                width: None,
                cells: vec![
                    cell(EnumCellValue::Integer(9_007_199_254_740_993)),
                    cell(EnumCellValue::Integer(-9_007_199_254_740_993)),
                    cell(EnumCellValue::Integer(9_007_199_254_740_992)),
                ],
            }],
        };

        let (_, range) = read_sheet(save_document_to_buffer(&document).unwrap());
        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("9007199254740993".to_string()))
        );
        assert_eq!(
            range.get_value((1, 0)),
            Some(&Data::String("-9007199254740993".to_string()))
        );
        assert_eq!(range.get_value((2, 0)), Some(&Data::Float(9_007_199_254_740_992.0)));
    }

    #[test]
    fn test_datetime_written_as_dated_serial() {
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let document = SpecSheetDocument {
            sheet_name: "Sheet1".to_string(),
            columns: vec![SpecDocumentColumn {
                width: None,
                cells: vec![SpecDocumentCell {
                    value: EnumCellValue::DateTime(dt),
                    format: SpecCellFormat {
                        num_format: Some(crate::conf::C_NUM_FORMAT_DATETIME.to_string()),
                        ..Default::default()
                    },
                }],
            }],
        };

        let (_, range) = read_sheet(save_document_to_buffer(&document).unwrap());
        match range.get_value((0, 0)) {
            Some(Data::DateTime(val)) => {
                assert_eq!(val.as_f64(), 45293.5);
                assert_eq!(val.as_datetime(), Some(dt));
            }
            other => panic!("unexpected cell {other:?}"),
        }
    }

    #[test]
    fn test_empty_document_encodes() {
        let bytes = save_document_to_buffer(&SpecSheetDocument {
            sheet_name: "Sheet1".to_string(),
            columns: vec![],
        })
        .unwrap();
        let (l_names, range) = read_sheet(bytes);
        assert_eq!(l_names, vec!["Sheet1"]);
        assert!(range.is_empty());
    }

    #[test]
    fn test_file_sink_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        std::fs::write(&path, b"stale").unwrap();

        save_document_to_path(&build_document("Sheet1"), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let (_, range) = read_sheet(bytes);
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("y".to_string())));
        // no stray temp files next to the target
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_file_sink_reports_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("out.xlsx");

        let err = save_document_to_path(&build_document("Sheet1"), &path).unwrap_err();
        match err {
            SortSheetError::Write { path: Some(p), .. } => assert_eq!(p, path),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_derive_format_align_and_border() {
        assert_eq!(derive_format_align(" VCenter "), Some(FormatAlign::VerticalCenter));
        assert_eq!(derive_format_align("sideways"), None);
        assert_eq!(derive_format_border(1), FormatBorder::Thin);
        assert_eq!(derive_format_border(99), FormatBorder::None);
    }
}
