use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use suzstar_common::AppError;

use crate::error::PageError;
use crate::notice::{redirect_with, Notice};
use crate::services::{AppState, ResourceService};

/// `attachment` disposition naming the stored file.
fn attachment(file_name: &str) -> Result<HeaderValue, AppError> {
    let name: String = file_name.chars().filter(|c| *c != '"' && *c != '\\').collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", name))
        .map_err(|e| AppError::Internal(format!("Invalid download file name: {}", e)))
}

pub async fn download_resource(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response, PageError> {
    let Some(download) = ResourceService::new(&state).open_download(id).await? else {
        return Ok(redirect_with(&format!("/resources/{}", id), Notice::DownloadUnavailable).into_response());
    };

    let disposition = attachment(&download.file_name)?;
    let body = Body::from_stream(ReaderStream::new(download.file));
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
