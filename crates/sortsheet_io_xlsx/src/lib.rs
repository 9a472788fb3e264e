//! `sortsheet_io_xlsx` v1:
//! Sort spreadsheet rows by column E and write a formatted workbook.
//!
//! Modules follow the data flow:
//! - `conf`     : constants and default presets
//! - `spec`     : specs/models/reports/errors
//! - `util`     : pure helper functions
//! - `table`    : table model and polars sort keys
//! - `reader`   : first-sheet loader (calamine)
//! - `sorter`   : stable ascending sort by column E
//! - `document` : table to in-memory sheet document
//! - `format`   : alignment, wrap and auto-fit widths
//! - `writer`   : file and buffer sinks (rust_xlsxwriter)
//! - `pipeline` : end-to-end batch and in-memory runs
pub mod conf;
pub mod document;
pub mod format;
pub mod pipeline;
pub mod reader;
pub mod sorter;
pub mod spec;
pub mod table;
pub mod util;
pub mod writer;

pub use conf::{
    C_COL_SORT_KEY_LETTER, C_FILE_IN_DEFAULT, C_FILE_OUT_DOWNLOAD, C_MIME_XLSX,
    N_IDX_COL_SORT_KEY, N_WIDTH_CELL_PADDING, TUP_EXT_UPLOAD_ACCEPTED,
};
pub use document::derive_document_from_table;
pub use format::autofit_document;
pub use pipeline::{SpecSortOutcome, build_sorted_document, run_bytes, run_file};
pub use reader::{EnumTableSource, load_table, load_table_from_bytes, load_table_from_path};
pub use sorter::sort_by_column_e;
pub use spec::{
    EnumCellValue, EnumKeyCompareMode, SortSheetError, SpecCellFormat, SpecDocumentCell,
    SpecDocumentColumn, SpecSheetDocument, SpecSortReport,
};
pub use table::SpecSheetTable;
pub use util::{derive_extension_lower, derive_output_path, render_cell_text};
pub use writer::{save_document_to_buffer, save_document_to_path};
