//! Load → sort → document → format → sink orchestration.

use std::path::Path;

use crate::conf::C_SHEET_NAME_OUTPUT;
use crate::document::derive_document_from_table;
use crate::format::autofit_document;
use crate::reader::{EnumTableSource, load_table, load_table_from_bytes};
use crate::sorter::sort_by_column_e;
use crate::spec::{SortSheetError, SpecSheetDocument, SpecSortReport};
use crate::table::SpecSheetTable;
use crate::writer::{save_document_to_buffer, save_document_to_path};

/// Result of an in-memory run.
#[derive(Debug, Clone)]
pub struct SpecSortOutcome {
    /// Sorted table, for previews.
    pub table: SpecSheetTable,
    /// Run summary.
    pub report: SpecSortReport,
    /// Formatted `.xlsx` bytes.
    pub bytes: Vec<u8>,
}

/// Sort `table` by column E and lay it out as a formatted document.
pub fn build_sorted_document(
    table: &SpecSheetTable,
) -> Result<(SpecSheetDocument, SpecSheetTable, SpecSortReport), SortSheetError> {
    let (table_sorted, report) = sort_by_column_e(table)?;
    let mut document = derive_document_from_table(&table_sorted, C_SHEET_NAME_OUTPUT)?;
    autofit_document(&mut document);
    Ok((document, table_sorted, report))
}

/// Batch run: read `input`, write the sorted workbook to `output`.
///
/// `output` is only touched once every earlier step has succeeded.
pub fn run_file(input: &Path, output: &Path) -> Result<SpecSortReport, SortSheetError> {
    let table = load_table(&EnumTableSource::Path(input.to_path_buf()))?;
    let (document, _, report) = build_sorted_document(&table)?;
    save_document_to_path(&document, output)?;

    for c_warning in &report.warnings {
        log::warn!("{c_warning}");
    }
    log::info!("{} -> {}", report, output.display());
    Ok(report)
}

/// Interactive run: sort uploaded workbook bytes into new workbook bytes.
pub fn run_bytes(bytes: &[u8]) -> Result<SpecSortOutcome, SortSheetError> {
    let table = load_table_from_bytes(bytes)?;
    let (document, table_sorted, report) = build_sorted_document(&table)?;
    let v_bytes = save_document_to_buffer(&document)?;

    for c_warning in &report.warnings {
        log::warn!("{c_warning}");
    }
    log::info!("{} bytes_out={}", report, v_bytes.len());
    Ok(SpecSortOutcome {
        table: table_sorted,
        report,
        bytes: v_bytes,
    })
}
