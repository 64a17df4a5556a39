//! Axum route handlers for the Letters API.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::letters::generator::{
    generate_letter, parse_idempotency_key, validate_letter_text, GenerateLetterRequest,
};
use crate::letters::html::render_letter_html;
use crate::models::letter::{LetterDetail, LetterSummary, LetterUpdate};
use crate::state::AppState;
use crate::validation::non_blank;

pub const IDEMPOTENCY_HEADER: &str = "idempotency-key";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GenerateLetterResponse {
    pub success: bool,
    pub letter_id: i32,
    pub letter_content: String,
    pub replayed: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLetterRequest {
    pub subject: Option<String>,
    pub reason: Option<String>,
    /// Replacement body as plain text. It is escaped into the template like
    /// every other field. When absent or blank the body follows the reason.
    #[serde(alias = "body")]
    pub generated_letter: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/letters
pub async fn handle_list_letters(
    State(state): State<AppState>,
) -> Result<Json<Vec<LetterSummary>>, AppError> {
    Ok(Json(state.store.list_letters().await?))
}

/// GET /api/letters/:id
pub async fn handle_get_letter(
    State(state): State<AppState>,
    Path(letter_id): Path<i32>,
) -> Result<Json<LetterDetail>, AppError> {
    state
        .store
        .get_letter(letter_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Letter {letter_id} not found")))
}

/// POST /api/generate-letter and POST /api/generate
///
/// Renders the letter against the current company version and stores it.
/// Honors an optional `Idempotency-Key` header.
pub async fn handle_generate_letter(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(req): AppJson<GenerateLetterRequest>,
) -> Result<(StatusCode, Json<GenerateLetterResponse>), AppError> {
    let raw_key = headers
        .get(IDEMPOTENCY_HEADER)
        .map(|v| {
            v.to_str()
                .map_err(|_| AppError::Validation("Idempotency-Key must be ASCII".to_string()))
        })
        .transpose()?;
    let idempotency_key = parse_idempotency_key(raw_key)?;

    let today = chrono::Local::now().date_naive();
    let generated = generate_letter(
        state.store.as_ref(),
        state.assets.base_url(),
        req,
        idempotency_key,
        today,
    )
    .await?;

    let status = if generated.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(GenerateLetterResponse {
            success: true,
            letter_id: generated.letter.summary.letter_id,
            letter_content: generated.letter.generated_letter,
            replayed: generated.replayed,
        }),
    ))
}

/// PUT /api/letters/:id
///
/// Changes subject, reason and body only. The stored HTML is always
/// re-rendered from the snapshot, so the PDF and Word exports stay in step.
pub async fn handle_update_letter(
    State(state): State<AppState>,
    Path(letter_id): Path<i32>,
    AppJson(req): AppJson<UpdateLetterRequest>,
) -> Result<Json<LetterDetail>, AppError> {
    let (subject, reason) = validate_letter_text(req.subject.as_deref(), req.reason.as_deref())?;

    let existing = state
        .store
        .get_letter(letter_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Letter {letter_id} not found")))?;

    let mut content = existing.content.0;
    content.subject = subject.clone();
    content.reason = reason.clone();
    content.body = non_blank(req.generated_letter.as_deref());
    let generated_letter = render_letter_html(&content, state.assets.base_url());

    let update = LetterUpdate {
        subject,
        reason,
        generated_letter,
        content,
    };
    state
        .store
        .update_letter(letter_id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Letter {letter_id} not found")))
}
