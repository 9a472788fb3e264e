//! Spreadsheet loader: first worksheet of a workbook into a [`SpecSheetTable`].

use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use calamine::{
    CellErrorType, Data, Range, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs,
};
use chrono::{NaiveDate, NaiveDateTime};

use crate::spec::{EnumCellValue, SortSheetError};
use crate::table::SpecSheetTable;
use crate::util::render_cell_text;

/// Where the loader reads workbook bytes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumTableSource {
    /// Workbook file; container chosen from the extension.
    Path(PathBuf),
    /// In-memory workbook; container sniffed from the content.
    Bytes(Vec<u8>),
}

/// Load the first worksheet of `source` as a table.
pub fn load_table(source: &EnumTableSource) -> Result<SpecSheetTable, SortSheetError> {
    match source {
        EnumTableSource::Path(path) => load_table_from_path(path),
        EnumTableSource::Bytes(bytes) => load_table_from_bytes(bytes),
    }
}

/// Load the first worksheet of the workbook at `path`.
pub fn load_table_from_path(path: &Path) -> Result<SpecSheetTable, SortSheetError> {
    log::debug!("Loading workbook from {}", path.display());
    let mut workbook = open_workbook_auto(path)
        .map_err(|err| SortSheetError::Format(format!("{}: {err}", path.display())))?;
    load_first_sheet(&mut workbook)
}

/// Load the first worksheet of an in-memory workbook.
pub fn load_table_from_bytes(bytes: &[u8]) -> Result<SpecSheetTable, SortSheetError> {
    log::debug!("Loading workbook from {} uploaded bytes", bytes.len());
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|err| SortSheetError::Format(err.to_string()))?;
    load_first_sheet(&mut workbook)
}

fn load_first_sheet<RS>(workbook: &mut Sheets<RS>) -> Result<SpecSheetTable, SortSheetError>
where
    RS: Read + Seek,
{
    let Some(range) = workbook.worksheet_range_at(0) else {
        log::warn!("Workbook contains no worksheet; loading an empty table");
        return SpecSheetTable::from_rows(&[], &[]);
    };
    let range = range.map_err(|err| SortSheetError::Format(err.to_string()))?;
    derive_table_from_range(&range)
}

/// Convert a decoded cell range into a table.
///
/// The first row of the range is the header. Columns are anchored at
/// column A so positional identity survives leading empty columns.
pub fn derive_table_from_range(range: &Range<Data>) -> Result<SpecSheetTable, SortSheetError> {
    let (n_height, n_width) = range.get_size();
    if n_height == 0 || n_width == 0 {
        return SpecSheetTable::from_rows(&[], &[]);
    }
    let n_col_offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    let mut it_rows = range.rows();
    let l_headers: Vec<String> = match it_rows.next() {
        Some(row_header) => std::iter::repeat_n(String::new(), n_col_offset)
            .chain(
                row_header
                    .iter()
                    .map(|cell| render_cell_text(&convert_data_to_cell_value(cell))),
            )
            .collect(),
        None => vec![],
    };

    let l_rows: Vec<Vec<EnumCellValue>> = it_rows
        .map(|row| {
            std::iter::repeat_n(EnumCellValue::None, n_col_offset)
                .chain(row.iter().map(convert_data_to_cell_value))
                .collect()
        })
        .collect();

    log::debug!(
        "Decoded range {}x{} (column offset {n_col_offset})",
        n_height,
        n_width
    );
    SpecSheetTable::from_rows(&l_headers, &l_rows)
}

/// Map one decoded cell to a table value.
pub fn convert_data_to_cell_value(cell: &Data) -> EnumCellValue {
    match cell {
        Data::Empty => EnumCellValue::None,
        Data::String(s) => {
            if s.is_empty() {
                EnumCellValue::None
            } else {
                EnumCellValue::String(s.clone())
            }
        }
        Data::Float(n) => EnumCellValue::Number(*n),
        Data::Int(n) => EnumCellValue::Integer(*n),
        Data::Bool(b) => EnumCellValue::Boolean(*b),
        Data::DateTime(dt) => {
            if dt.is_datetime()
                && let Some(val) = dt.as_datetime()
            {
                EnumCellValue::DateTime(val)
            } else {
                EnumCellValue::Number(dt.as_f64())
            }
        }
        Data::DateTimeIso(s) => match parse_iso_datetime(s) {
            Some(val) => EnumCellValue::DateTime(val),
            None => EnumCellValue::String(s.clone()),
        },
        Data::DurationIso(s) => EnumCellValue::String(s.clone()),
        Data::Error(CellErrorType::NA) => EnumCellValue::None,
        Data::Error(err) => EnumCellValue::String(err.to_string()),
    }
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
