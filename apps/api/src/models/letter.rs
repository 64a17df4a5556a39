use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::letters::content::LetterContent;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Word,
    #[default]
    Both,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Word => "word",
            ExportFormat::Both => "both",
        }
    }
}

/// A letter joined with its employee, as shown in list views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LetterSummary {
    pub letter_id: i32,
    pub employee_id: i32,
    pub employee_name: String,
    pub department: String,
    pub email: String,
    pub subject: String,
    pub reason: String,
    pub format_selected: String,
    pub company_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full letter record including the rendered body and the content snapshot
/// both exporters work from.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LetterDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub summary: LetterSummary,
    pub generated_letter: String,
    pub content: Json<LetterContent>,
}

#[derive(Debug, Clone)]
pub struct NewLetter {
    pub employee_id: i32,
    pub subject: String,
    pub reason: String,
    pub generated_letter: String,
    pub format_selected: ExportFormat,
    pub content: LetterContent,
    pub company_version: i32,
    pub idempotency_key: Option<String>,
}

/// A manual edit. `content` is the snapshot with the edited subject,
/// reason and body applied; `generated_letter` is its rendering.
#[derive(Debug, Clone)]
pub struct LetterUpdate {
    pub subject: String,
    pub reason: String,
    pub generated_letter: String,
    pub content: LetterContent,
}
