//! Letter generation: resolve the employee, snapshot the current company,
//! render, persist.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::employees::handlers::validate_new_employee;
use crate::errors::AppError;
use crate::letters::content::LetterContent;
use crate::letters::html::render_letter_html;
use crate::models::employee::Employee;
use crate::models::letter::{ExportFormat, LetterDetail, NewLetter};
use crate::store::{LetterStore, StoreError};
use crate::validation::{check_max_len, non_blank, require_fields, SUBJECT_MAX};

pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

/// Accepted by both generate endpoints. The employee is either referenced by
/// `employee_id` or described inline and matched by email.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateLetterRequest {
    pub employee_id: Option<i32>,
    pub employee_name: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub reason: Option<String>,
    pub format_selected: Option<ExportFormat>,
}

#[derive(Debug)]
pub struct GeneratedLetter {
    pub letter: LetterDetail,
    /// True when an earlier request with the same idempotency key produced it.
    pub replayed: bool,
}

/// Trimmed, non-blank subject and reason; the subject must fit its column.
pub fn validate_letter_text(
    subject: Option<&str>,
    reason: Option<&str>,
) -> Result<(String, String), AppError> {
    let (subject, reason) = (non_blank(subject), non_blank(reason));
    require_fields(&[("subject", subject.is_some()), ("reason", reason.is_some())])?;
    let (subject, reason) = (subject.unwrap_or_default(), reason.unwrap_or_default());
    check_max_len("subject", &subject, SUBJECT_MAX)?;
    Ok((subject, reason))
}

/// Normalizes an `Idempotency-Key` header value.
pub fn parse_idempotency_key(raw: Option<&str>) -> Result<Option<String>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(key) if key.len() > MAX_IDEMPOTENCY_KEY_LEN => Err(AppError::Validation(format!(
            "Idempotency-Key must be at most {MAX_IDEMPOTENCY_KEY_LEN} characters"
        ))),
        Some(key) => Ok(Some(key.to_string())),
    }
}

async fn resolve_employee(
    store: &dyn LetterStore,
    req: &GenerateLetterRequest,
) -> Result<Employee, AppError> {
    if let Some(employee_id) = req.employee_id {
        return store
            .get_employee(employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {employee_id} not found")));
    }

    let inline = [&req.employee_name, &req.department, &req.email];
    if inline.iter().all(|v| non_blank(v.as_deref()).is_none()) {
        return Err(AppError::Validation(
            "Missing required fields: employee_id or employee_name, department, email".to_string(),
        ));
    }
    let details = validate_new_employee(
        req.employee_name.as_deref(),
        req.department.as_deref(),
        req.email.as_deref(),
    )?;

    // Existing records win: employees are never updated from a letter form.
    if let Some(existing) = store.find_employee_by_email(&details.email).await? {
        return Ok(existing);
    }
    match store.insert_employee(&details).await {
        Ok(created) => Ok(created),
        Err(StoreError::Duplicate(_)) => store
            .find_employee_by_email(&details.email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", details.email))),
        Err(e) => Err(e.into()),
    }
}

pub async fn generate_letter(
    store: &dyn LetterStore,
    asset_base_url: &str,
    req: GenerateLetterRequest,
    idempotency_key: Option<String>,
    today: NaiveDate,
) -> Result<GeneratedLetter, AppError> {
    let (subject, reason) = validate_letter_text(req.subject.as_deref(), req.reason.as_deref())?;

    if let Some(key) = &idempotency_key {
        if let Some(letter) = store.find_letter_by_idempotency_key(key).await? {
            info!("Replaying letter {} for idempotency key", letter.summary.letter_id);
            return Ok(GeneratedLetter {
                letter,
                replayed: true,
            });
        }
    }

    let employee = resolve_employee(store, &req).await?;
    let company = store
        .current_company()
        .await?
        .ok_or_else(|| AppError::NotFound("Company details not found".to_string()))?;

    let content = LetterContent::new(&company, &employee, &subject, &reason, today);
    let html = render_letter_html(&content, asset_base_url);

    let new_letter = NewLetter {
        employee_id: employee.employee_id,
        subject: content.subject.clone(),
        reason: content.reason.clone(),
        generated_letter: html,
        format_selected: req.format_selected.unwrap_or_default(),
        content,
        company_version: company.version,
        idempotency_key: idempotency_key.clone(),
    };

    match store.insert_letter(&new_letter).await {
        Ok(letter) => Ok(GeneratedLetter {
            letter,
            replayed: false,
        }),
        // Lost a race with a concurrent request carrying the same key.
        Err(StoreError::Duplicate(msg)) => {
            let key = idempotency_key.unwrap_or_default();
            warn!("Concurrent generate with the same idempotency key");
            store
                .find_letter_by_idempotency_key(&key)
                .await?
                .map(|letter| GeneratedLetter {
                    letter,
                    replayed: true,
                })
                .ok_or(AppError::Conflict(msg))
        }
        Err(e) => Err(e.into()),
    }
}
