//! Cosmetic formatting pass: alignment, wrap and auto-fit column widths.

use crate::conf::{N_WIDTH_CELL_PADDING, derive_autofit_alignment_patch};
use crate::spec::{SpecDocumentCell, SpecSheetDocument};
use crate::util::measure_cell_text;

/// Style every cell and auto-fit every column of `document` in place.
///
/// Each cell gets left/vcenter alignment with wrap enabled, overlaid on its
/// existing format. Each column width becomes the longest rendered cell text
/// of that column (header included, nulls count as empty) plus
/// [`N_WIDTH_CELL_PADDING`]. The result depends only on cell contents, so
/// running it again changes nothing.
pub fn autofit_document(document: &mut SpecSheetDocument) {
    let fmt_patch = derive_autofit_alignment_patch();

    for col in document.columns.iter_mut() {
        for cell in col.cells.iter_mut() {
            cell.format = cell.format.merge(&fmt_patch);
        }
        col.width = Some(calculate_autofit_width(&col.cells) as f64);
    }

    log::debug!(
        "Formatted {} columns x {} rows",
        document.width(),
        document.height()
    );
}

/// Width for a column: longest rendered cell plus fixed padding.
pub fn calculate_autofit_width(cells: &[SpecDocumentCell]) -> usize {
    cells
        .iter()
        .map(|cell| measure_cell_text(&cell.value))
        .max()
        .unwrap_or(0)
        + N_WIDTH_CELL_PADDING
}
