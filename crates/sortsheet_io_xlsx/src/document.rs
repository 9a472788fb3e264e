//! Serialize a table into an in-memory sheet document.

use crate::conf::{EnumFmtKey, derive_default_document_formats};
use crate::spec::{
    EnumCellValue, SortSheetError, SpecDocumentCell, SpecDocumentColumn, SpecSheetDocument,
};
use crate::table::SpecSheetTable;

/// Build a document with one header row plus one row per table row.
///
/// Columns keep table order. Header cells get the header preset, body cells
/// the body preset, date-time body cells additionally the datetime preset.
/// No widths are set.
pub fn derive_document_from_table(
    table: &SpecSheetTable,
    sheet_name: &str,
) -> Result<SpecSheetDocument, SortSheetError> {
    let dict_fmt = derive_default_document_formats();
    let fmt_header = dict_fmt
        .get(EnumFmtKey::Header.as_str())
        .cloned()
        .unwrap_or_default();
    let fmt_body = dict_fmt
        .get(EnumFmtKey::Body.as_str())
        .cloned()
        .unwrap_or_default();
    let fmt_body_datetime = fmt_body.merge(
        &dict_fmt
            .get(EnumFmtKey::Datetime.as_str())
            .cloned()
            .unwrap_or_default(),
    );

    let l_colnames = table.column_names();
    let mut l_columns = Vec::with_capacity(l_colnames.len());
    for (n_idx_col, c_name) in l_colnames.into_iter().enumerate() {
        let mut l_cells = Vec::with_capacity(table.height() + 1);
        l_cells.push(SpecDocumentCell {
            value: EnumCellValue::String(c_name),
            format: fmt_header.clone(),
        });
        for value in table.column_values(n_idx_col)? {
            let format = match value {
                EnumCellValue::DateTime(_) => fmt_body_datetime.clone(),
                _ => fmt_body.clone(),
            };
            l_cells.push(SpecDocumentCell { value, format });
        }
        l_columns.push(SpecDocumentColumn {
            width: None,
            cells: l_cells,
        });
    }

    Ok(SpecSheetDocument {
        sheet_name: sheet_name.to_string(),
        columns: l_columns,
    })
}
