//! In-memory `LetterStore` for handler tests. Mirrors the schema's
//! constraints: VARCHAR limits, unique email, unique idempotency key and the
//! FK cascade.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;

use crate::letters::content::LetterContent;
use crate::letters::generator::MAX_IDEMPOTENCY_KEY_LEN;
use crate::models::company::{CompanyDetails, NewCompanyVersion};
use crate::models::employee::{Employee, NewEmployee};
use crate::models::letter::{LetterDetail, LetterSummary, LetterUpdate, NewLetter};
use crate::store::{LetterStore, StoreError, StoreResult};
use crate::validation::{DEPARTMENT_MAX, EMAIL_MAX, IMAGE_PATH_MAX, NAME_MAX, SUBJECT_MAX};

/// Fails like PostgreSQL does when a value overflows its VARCHAR column.
fn fits(value: &str, max: usize) -> StoreResult<()> {
    if value.chars().count() > max {
        return Err(StoreError::Database(sqlx::Error::Protocol(format!(
            "value too long for type character varying({max})"
        ))));
    }
    Ok(())
}

struct LetterRow {
    letter_id: i32,
    employee_id: i32,
    subject: String,
    reason: String,
    generated_letter: String,
    format_selected: String,
    content: LetterContent,
    company_version: i32,
    idempotency_key: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    employees: Vec<Employee>,
    companies: Vec<CompanyDetails>,
    letters: Vec<LetterRow>,
    next_employee_id: i32,
    next_letter_id: i32,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn with_company(company: CompanyDetails) -> Self {
        let store = MemoryStore::default();
        store.tables.lock().unwrap().companies.push(company);
        store
    }

    pub fn letter_count(&self) -> usize {
        self.tables.lock().unwrap().letters.len()
    }
}

impl Tables {
    fn detail(&self, row: &LetterRow) -> Option<LetterDetail> {
        let employee = self
            .employees
            .iter()
            .find(|e| e.employee_id == row.employee_id)?;
        Some(LetterDetail {
            summary: LetterSummary {
                letter_id: row.letter_id,
                employee_id: row.employee_id,
                employee_name: employee.name.clone(),
                department: employee.department.clone(),
                email: employee.email.clone(),
                subject: row.subject.clone(),
                reason: row.reason.clone(),
                format_selected: row.format_selected.clone(),
                company_version: row.company_version,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            generated_letter: row.generated_letter.clone(),
            content: Json(row.content.clone()),
        })
    }
}

#[async_trait]
impl LetterStore for MemoryStore {
    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        let mut employees = self.tables.lock().unwrap().employees.clone();
        employees.sort_by(|a, b| a.name.cmp(&b.name).then(a.employee_id.cmp(&b.employee_id)));
        Ok(employees)
    }

    async fn get_employee(&self, employee_id: i32) -> StoreResult<Option<Employee>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .employees
            .iter()
            .find(|e| e.employee_id == employee_id)
            .cloned())
    }

    async fn find_employee_by_email(&self, email: &str) -> StoreResult<Option<Employee>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.employees.iter().find(|e| e.email == email).cloned())
    }

    async fn insert_employee(&self, employee: &NewEmployee) -> StoreResult<Employee> {
        fits(&employee.name, NAME_MAX)?;
        fits(&employee.department, DEPARTMENT_MAX)?;
        fits(&employee.email, EMAIL_MAX)?;
        let mut tables = self.tables.lock().unwrap();
        if tables.employees.iter().any(|e| e.email == employee.email) {
            return Err(StoreError::Duplicate(format!(
                "An employee with email {} already exists",
                employee.email
            )));
        }
        tables.next_employee_id += 1;
        let row = Employee {
            employee_id: tables.next_employee_id,
            name: employee.name.clone(),
            department: employee.department.clone(),
            email: employee.email.clone(),
            created_at: Utc::now(),
        };
        tables.employees.push(row.clone());
        Ok(row)
    }

    async fn delete_employee(&self, employee_id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.employees.len();
        tables.employees.retain(|e| e.employee_id != employee_id);
        let removed = tables.employees.len() < before;
        if removed {
            tables.letters.retain(|l| l.employee_id != employee_id);
        }
        Ok(removed)
    }

    async fn current_company(&self) -> StoreResult<Option<CompanyDetails>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.companies.iter().max_by_key(|c| c.version).cloned())
    }

    async fn insert_company_version(
        &self,
        company: &NewCompanyVersion,
    ) -> StoreResult<CompanyDetails> {
        fits(&company.name, NAME_MAX)?;
        fits(&company.founder_name, NAME_MAX)?;
        fits(&company.founder_title, NAME_MAX)?;
        for path in [
            &company.logo_url,
            &company.founder_signature_url,
            &company.seal_url,
        ]
        .into_iter()
        .flatten()
        {
            fits(path, IMAGE_PATH_MAX)?;
        }
        let mut tables = self.tables.lock().unwrap();
        let version = tables.companies.iter().map(|c| c.version).max().unwrap_or(0) + 1;
        let company_id = tables.companies.iter().map(|c| c.company_id).max().unwrap_or(0) + 1;
        let row = CompanyDetails {
            company_id,
            version,
            name: company.name.clone(),
            address: company.address.clone(),
            logo_url: company.logo_url.clone(),
            founder_name: company.founder_name.clone(),
            founder_title: company.founder_title.clone(),
            founder_signature_url: company.founder_signature_url.clone(),
            seal_url: company.seal_url.clone(),
            created_at: Utc::now(),
        };
        tables.companies.push(row.clone());
        Ok(row)
    }

    async fn list_letters(&self) -> StoreResult<Vec<LetterSummary>> {
        let tables = self.tables.lock().unwrap();
        let mut letters: Vec<LetterSummary> = tables
            .letters
            .iter()
            .filter_map(|row| tables.detail(row))
            .map(|detail| detail.summary)
            .collect();
        letters.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.letter_id.cmp(&a.letter_id))
        });
        Ok(letters)
    }

    async fn get_letter(&self, letter_id: i32) -> StoreResult<Option<LetterDetail>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .letters
            .iter()
            .find(|l| l.letter_id == letter_id)
            .and_then(|row| tables.detail(row)))
    }

    async fn find_letter_by_idempotency_key(
        &self,
        key: &str,
    ) -> StoreResult<Option<LetterDetail>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .letters
            .iter()
            .find(|l| l.idempotency_key.as_deref() == Some(key))
            .and_then(|row| tables.detail(row)))
    }

    async fn insert_letter(&self, letter: &NewLetter) -> StoreResult<LetterDetail> {
        fits(&letter.subject, SUBJECT_MAX)?;
        if let Some(key) = &letter.idempotency_key {
            fits(key, MAX_IDEMPOTENCY_KEY_LEN)?;
        }
        let mut tables = self.tables.lock().unwrap();
        if !tables
            .employees
            .iter()
            .any(|e| e.employee_id == letter.employee_id)
        {
            return Err(StoreError::MissingReference(format!(
                "Employee {} not found",
                letter.employee_id
            )));
        }
        if let Some(key) = &letter.idempotency_key {
            if tables
                .letters
                .iter()
                .any(|l| l.idempotency_key.as_ref() == Some(key))
            {
                return Err(StoreError::Duplicate(
                    "A letter was already generated for this request".to_string(),
                ));
            }
        }
        tables.next_letter_id += 1;
        let now = Utc::now();
        let row = LetterRow {
            letter_id: tables.next_letter_id,
            employee_id: letter.employee_id,
            subject: letter.subject.clone(),
            reason: letter.reason.clone(),
            generated_letter: letter.generated_letter.clone(),
            format_selected: letter.format_selected.as_str().to_string(),
            content: letter.content.clone(),
            company_version: letter.company_version,
            idempotency_key: letter.idempotency_key.clone(),
            created_at: now,
            updated_at: now,
        };
        let detail = tables
            .detail(&row)
            .ok_or_else(|| StoreError::MissingReference("employee vanished".to_string()))?;
        tables.letters.push(row);
        Ok(detail)
    }

    async fn update_letter(
        &self,
        letter_id: i32,
        update: &LetterUpdate,
    ) -> StoreResult<Option<LetterDetail>> {
        fits(&update.subject, SUBJECT_MAX)?;
        let mut tables = self.tables.lock().unwrap();
        let Some(index) = tables.letters.iter().position(|l| l.letter_id == letter_id) else {
            return Ok(None);
        };
        {
            let row = &mut tables.letters[index];
            row.subject = update.subject.clone();
            row.reason = update.reason.clone();
            row.generated_letter = update.generated_letter.clone();
            row.content = update.content.clone();
            row.updated_at = Utc::now();
        }
        Ok(tables.detail(&tables.letters[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_overlong_department_fails_like_the_column() {
        let store = MemoryStore::default();
        let err = store
            .insert_employee(&NewEmployee {
                name: "A".to_string(),
                department: "d".repeat(DEPARTMENT_MAX + 1),
                email: "a@abhimo.com".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
        assert!(store.list_employees().await.unwrap().is_empty());
    }
}
