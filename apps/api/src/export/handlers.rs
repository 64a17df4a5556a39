//! Axum route handlers for letter downloads.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::export::docx::{build_letter_docx, LetterImages};
use crate::export::{DOCX_MIME, PDF_MIME};
use crate::models::letter::LetterDetail;
use crate::state::AppState;

async fn load_letter(state: &AppState, letter_id: i32) -> Result<LetterDetail, AppError> {
    state
        .store
        .get_letter(letter_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Letter {letter_id} not found")))
}

fn attachment(mime: &'static str, filename: String, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        Bytes::from(body),
    )
        .into_response()
}

/// GET /api/download/pdf/:id
///
/// Prints the stored HTML body, so manual edits to the body are honored.
pub async fn handle_download_pdf(
    State(state): State<AppState>,
    Path(letter_id): Path<i32>,
) -> Result<Response, AppError> {
    let letter = load_letter(&state, letter_id).await?;

    let pdf = state
        .pdf
        .render(&letter.generated_letter)
        .await
        .map_err(|e| AppError::Export(format!("PDF export of letter {letter_id} failed: {e:#}")))?;

    info!("Exported letter {letter_id} as PDF");
    Ok(attachment(
        PDF_MIME,
        format!("appreciation_letter_{letter_id}.pdf"),
        pdf,
    ))
}

/// GET /api/download/docx/:id (also served as /api/download/word/:id)
///
/// Rebuilt from the content snapshot taken at generation time.
pub async fn handle_download_docx(
    State(state): State<AppState>,
    Path(letter_id): Path<i32>,
) -> Result<Response, AppError> {
    let letter = load_letter(&state, letter_id).await?;

    let images = LetterImages::load(&letter.content, &state.assets).await?;
    let docx = build_letter_docx(&letter.content, &images)?;

    info!("Exported letter {letter_id} as DOCX");
    Ok(attachment(
        DOCX_MIME,
        format!("appreciation_letter_{letter_id}.docx"),
        docx,
    ))
}
