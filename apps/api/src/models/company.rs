use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One version of the company branding used on letters.
/// Rows are append-only; the current company is the highest `version`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct CompanyDetails {
    pub company_id: i32,
    pub version: i32,
    pub name: String,
    pub address: String,
    pub logo_url: Option<String>,
    pub founder_name: String,
    pub founder_title: String,
    pub founder_signature_url: Option<String>,
    pub seal_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCompanyVersion {
    pub name: String,
    pub address: String,
    pub logo_url: Option<String>,
    pub founder_name: String,
    pub founder_title: String,
    pub founder_signature_url: Option<String>,
    pub seal_url: Option<String>,
}
