//! `sortsheet_web` v1:
//! Single-page upload form that sorts a workbook by column E.
//!
//! - `GET /`          : upload form
//! - `POST /`         : form submission; page re-rendered with preview and download link
//! - `POST /api/sort` : same pipeline, formatted workbook returned as an attachment
//!
//! Every request runs its own pipeline on a blocking worker; no state is kept
//! between requests.

use std::fmt;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use sortsheet_io_xlsx::{
    C_FILE_OUT_DOWNLOAD, C_MIME_XLSX, SortSheetError, SpecSortOutcome, TUP_EXT_UPLOAD_ACCEPTED,
    derive_extension_lower, render_cell_text, run_bytes,
};

/// Multipart field carrying the workbook.
pub const C_FIELD_UPLOAD: &str = "file";
/// Upload size limit used when none is configured.
pub const N_BYTES_UPLOAD_DEFAULT: usize = 50 * 1024 * 1024;
/// Rows shown in the HTML preview; the download always has every row.
pub const N_ROWS_PREVIEW_MAX: usize = 1_000;

const C_PAGE_TEMPLATE: &str = include_str!("../static/index.html");

////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failure while handling one upload.
#[derive(Debug)]
pub enum WebUploadError {
    /// Multipart body could not be read (malformed or over the size limit).
    Multipart(String),
    /// No non-empty `file` field in the form.
    MissingFile,
    /// File name does not end in an accepted extension.
    Extension(String),
    /// Pipeline failure.
    Sort(SortSheetError),
    /// Blocking worker panicked or was cancelled.
    Worker(String),
}

impl WebUploadError {
    /// HTTP status for the API surface.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Multipart(_) | Self::MissingFile => StatusCode::BAD_REQUEST,
            Self::Extension(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Sort(SortSheetError::Format(_) | SortSheetError::Schema { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Sort(_) | Self::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for WebUploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Multipart(msg) => write!(f, "Invalid upload: {msg}"),
            Self::MissingFile => write!(f, "Vui lòng tải file Excel để bắt đầu."),
            Self::Extension(name) => write!(
                f,
                "Không thể đọc file Excel: unsupported file type {name:?} (expected .{})",
                TUP_EXT_UPLOAD_ACCEPTED.join(", .")
            ),
            Self::Sort(err @ SortSheetError::Format(_)) => {
                write!(f, "Không thể đọc file Excel: {err}")
            }
            Self::Sort(err) => write!(f, "{err}"),
            Self::Worker(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for WebUploadError {}

impl From<SortSheetError> for WebUploadError {
    fn from(err: SortSheetError) -> Self {
        Self::Sort(err)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PageModel

/// Uploaded file as read from the form.
#[derive(Debug, Clone)]
pub struct SpecUpload {
    /// Client-side file name.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Data injected into the page as `RESULT`.
#[derive(Debug, Clone, Serialize, Default)]
pub struct SpecPageResult {
    /// `"ok"` or `"error"`.
    pub status: String,
    /// Banner text.
    pub message: String,
    /// Non-fatal warnings from the run.
    pub warnings: Vec<String>,
    /// Preview header.
    pub columns: Vec<String>,
    /// Preview rows, rendered as text.
    pub rows: Vec<Vec<String>>,
    /// Row count of the full sorted table.
    pub n_rows_total: usize,
    /// Suggested download file name.
    pub download_name: Option<String>,
    /// `data:` URL of the formatted workbook.
    pub download_href: Option<String>,
}

impl SpecPageResult {
    /// Page state after a successful run.
    pub fn from_outcome(outcome: &SpecSortOutcome) -> Result<Self, WebUploadError> {
        let l_rows = outcome.table.rows()?;
        let n_rows_total = l_rows.len();
        let rows = l_rows
            .iter()
            .take(N_ROWS_PREVIEW_MAX)
            .map(|row| row.iter().map(render_cell_text).collect())
            .collect();

        Ok(Self {
            status: "ok".to_string(),
            message: "Đã sắp xếp dữ liệu theo cột E (tăng dần).".to_string(),
            warnings: outcome.report.warnings.clone(),
            columns: outcome.table.column_names(),
            rows,
            n_rows_total,
            download_name: Some(C_FILE_OUT_DOWNLOAD.to_string()),
            download_href: Some(derive_data_url(&outcome.bytes)),
        })
    }

    /// Page state after a failed run.
    pub fn from_error(err: &WebUploadError) -> Self {
        Self {
            status: "error".to_string(),
            message: err.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Router

/// Build the application router with an upload limit of `max_upload_bytes`.
pub fn build_router(max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(serve_form).post(sort_upload_page))
        .route("/api/sort", post(sort_upload_api))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

async fn serve_form() -> Html<String> {
    Html(render_page(None))
}

async fn sort_upload_page(multipart: Multipart) -> Html<String> {
    let result = match process_upload(multipart).await {
        Ok(outcome) => SpecPageResult::from_outcome(&outcome)
            .unwrap_or_else(|err| SpecPageResult::from_error(&err)),
        Err(err) => {
            log::warn!("Upload rejected: {err}");
            SpecPageResult::from_error(&err)
        }
    };
    Html(render_page(Some(&result)))
}

async fn sort_upload_api(multipart: Multipart) -> Response {
    match process_upload(multipart).await {
        Ok(outcome) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, C_MIME_XLSX.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{C_FILE_OUT_DOWNLOAD}\""),
                ),
            ],
            outcome.bytes,
        )
            .into_response(),
        Err(err) => {
            log::warn!("API upload rejected: {err}");
            (
                err.status(),
                Json(ErrorBody {
                    status: "error",
                    message: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Pipeline

async fn process_upload(multipart: Multipart) -> Result<SpecSortOutcome, WebUploadError> {
    let upload = read_upload(multipart).await?;
    validate_upload_name(&upload.file_name)?;
    log::info!(
        "Sorting upload {:?} ({} bytes)",
        upload.file_name,
        upload.bytes.len()
    );

    let outcome = tokio::task::spawn_blocking(move || run_bytes(&upload.bytes))
        .await
        .map_err(|err| WebUploadError::Worker(err.to_string()))??;
    Ok(outcome)
}

/// Read the `file` field of a multipart form.
pub async fn read_upload(mut multipart: Multipart) -> Result<SpecUpload, WebUploadError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| WebUploadError::Multipart(err.to_string()))?
    {
        if field.name() != Some(C_FIELD_UPLOAD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| WebUploadError::Multipart(err.to_string()))?;
        if file_name.is_empty() && bytes.is_empty() {
            break;
        }
        return Ok(SpecUpload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Err(WebUploadError::MissingFile)
}

/// Accept only `.xlsx`, `.xlsm` and `.xls` uploads.
pub fn validate_upload_name(file_name: &str) -> Result<(), WebUploadError> {
    match derive_extension_lower(file_name) {
        Some(ext) if TUP_EXT_UPLOAD_ACCEPTED.contains(&ext.as_str()) => Ok(()),
        _ => Err(WebUploadError::Extension(file_name.to_string())),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Rendering

/// Render the page, injecting `result` as the `RESULT` script constant.
pub fn render_page(result: Option<&SpecPageResult>) -> String {
    let c_json = serde_json::to_string(&result).unwrap_or_else(|_| "null".to_string());
    C_PAGE_TEMPLATE.replace(
        "</head>",
        &format!(
            "    <script>const RESULT = {};</script>\n</head>",
            c_json.replace("</", "<\\/")
        ),
    )
}

/// Encode workbook bytes as a `data:` URL.
pub fn derive_data_url(bytes: &[u8]) -> String {
    format!("data:{C_MIME_XLSX};base64,{}", STANDARD.encode(bytes))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
