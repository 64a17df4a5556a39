use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::models::company::{CompanyDetails, NewCompanyVersion};
use crate::models::employee::{Employee, NewEmployee};
use crate::models::letter::{LetterDetail, LetterSummary, LetterUpdate, NewLetter};
use crate::store::{LetterStore, StoreError, StoreResult};

/// Columns of `LetterDetail`, selected from a letters relation aliased `l`
/// joined to `employees e`.
const LETTER_COLUMNS: &str = r#"
    l.letter_id, l.employee_id, e.name AS employee_name, e.department, e.email,
    l.subject, l.reason, l.format_selected, l.company_version,
    l.created_at, l.updated_at, l.generated_letter, l.content
"#;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

/// Maps constraint violations onto `StoreError` variants the handlers act on.
fn classify(err: sqlx::Error, duplicate: &str, missing: &str) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate(duplicate.to_string());
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::MissingReference(missing.to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl LetterStore for PgStore {
    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        Ok(
            sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY name, employee_id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn get_employee(&self, employee_id: i32) -> StoreResult<Option<Employee>> {
        Ok(
            sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE employee_id = $1")
                .bind(employee_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_employee_by_email(&self, email: &str) -> StoreResult<Option<Employee>> {
        Ok(
            sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_employee(&self, employee: &NewEmployee) -> StoreResult<Employee> {
        let row = sqlx::query_as::<_, Employee>(
            "INSERT INTO employees (name, department, email) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&employee.name)
        .bind(&employee.department)
        .bind(&employee.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            classify(
                e,
                &format!("An employee with email {} already exists", employee.email),
                "Referenced row not found",
            )
        })?;

        info!("Inserted employee {} ({})", row.employee_id, row.email);
        Ok(row)
    }

    async fn delete_employee(&self, employee_id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE employee_id = $1")
            .bind(employee_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn current_company(&self) -> StoreResult<Option<CompanyDetails>> {
        Ok(sqlx::query_as::<_, CompanyDetails>(
            "SELECT * FROM company_details ORDER BY version DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_company_version(
        &self,
        company: &NewCompanyVersion,
    ) -> StoreResult<CompanyDetails> {
        // Append-only: the next version is computed in the same statement;
        // a concurrent writer loses on the unique version constraint.
        let row = sqlx::query_as::<_, CompanyDetails>(
            r#"
            INSERT INTO company_details
                (version, name, address, logo_url, founder_name, founder_title,
                 founder_signature_url, seal_url)
            SELECT COALESCE(MAX(version), 0) + 1, $1, $2, $3, $4, $5, $6, $7
            FROM company_details
            RETURNING *
            "#,
        )
        .bind(&company.name)
        .bind(&company.address)
        .bind(&company.logo_url)
        .bind(&company.founder_name)
        .bind(&company.founder_title)
        .bind(&company.founder_signature_url)
        .bind(&company.seal_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            classify(
                e,
                "Company details were changed concurrently; retry the update",
                "Referenced row not found",
            )
        })?;

        info!("Company details now at version {}", row.version);
        Ok(row)
    }

    async fn list_letters(&self) -> StoreResult<Vec<LetterSummary>> {
        Ok(sqlx::query_as::<_, LetterSummary>(
            r#"
            SELECT l.letter_id, l.employee_id, e.name AS employee_name, e.department, e.email,
                   l.subject, l.reason, l.format_selected, l.company_version,
                   l.created_at, l.updated_at
            FROM appreciation_letters l
            JOIN employees e ON e.employee_id = l.employee_id
            ORDER BY l.created_at DESC, l.letter_id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_letter(&self, letter_id: i32) -> StoreResult<Option<LetterDetail>> {
        let sql = format!(
            "SELECT {LETTER_COLUMNS} FROM appreciation_letters l \
             JOIN employees e ON e.employee_id = l.employee_id \
             WHERE l.letter_id = $1"
        );
        Ok(sqlx::query_as::<_, LetterDetail>(&sql)
            .bind(letter_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_letter_by_idempotency_key(
        &self,
        key: &str,
    ) -> StoreResult<Option<LetterDetail>> {
        let sql = format!(
            "SELECT {LETTER_COLUMNS} FROM appreciation_letters l \
             JOIN employees e ON e.employee_id = l.employee_id \
             WHERE l.idempotency_key = $1"
        );
        Ok(sqlx::query_as::<_, LetterDetail>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_letter(&self, letter: &NewLetter) -> StoreResult<LetterDetail> {
        let sql = format!(
            r#"
            WITH l AS (
                INSERT INTO appreciation_letters
                    (employee_id, subject, reason, generated_letter, format_selected,
                     content, company_version, idempotency_key)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            SELECT {LETTER_COLUMNS} FROM l
            JOIN employees e ON e.employee_id = l.employee_id
            "#
        );
        let row = sqlx::query_as::<_, LetterDetail>(&sql)
            .bind(letter.employee_id)
            .bind(&letter.subject)
            .bind(&letter.reason)
            .bind(&letter.generated_letter)
            .bind(letter.format_selected.as_str())
            .bind(Json(&letter.content))
            .bind(letter.company_version)
            .bind(&letter.idempotency_key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                classify(
                    e,
                    "A letter was already generated for this request",
                    &format!("Employee {} not found", letter.employee_id),
                )
            })?;

        info!(
            "Inserted letter {} for employee {}",
            row.summary.letter_id, row.summary.employee_id
        );
        Ok(row)
    }

    async fn update_letter(
        &self,
        letter_id: i32,
        update: &LetterUpdate,
    ) -> StoreResult<Option<LetterDetail>> {
        // Only subject, reason and body change; the caller keeps the
        // snapshot's company and recipient fields.
        let sql = format!(
            r#"
            WITH l AS (
                UPDATE appreciation_letters
                SET subject = $2,
                    reason = $3,
                    generated_letter = $4,
                    content = $5,
                    updated_at = NOW()
                WHERE letter_id = $1
                RETURNING *
            )
            SELECT {LETTER_COLUMNS} FROM l
            JOIN employees e ON e.employee_id = l.employee_id
            "#
        );
        let row = sqlx::query_as::<_, LetterDetail>(&sql)
            .bind(letter_id)
            .bind(&update.subject)
            .bind(&update.reason)
            .bind(&update.generated_letter)
            .bind(Json(&update.content))
            .fetch_optional(&self.pool)
            .await?;

        debug!("Update of letter {letter_id} matched: {}", row.is_some());
        Ok(row)
    }
}
