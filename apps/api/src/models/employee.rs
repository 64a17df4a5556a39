use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Employee {
    pub employee_id: i32,
    pub name: String,
    pub department: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new employee row.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub department: String,
    pub email: String,
}
