//! Data access layer. Handlers talk to a `LetterStore`; production wires in
//! `PgStore`, handler tests use `MemoryStore`.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::company::{CompanyDetails, NewCompanyVersion};
use crate::models::employee::{Employee, NewEmployee};
use crate::models::letter::{LetterDetail, LetterSummary, LetterUpdate, NewLetter};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (employee email, idempotency key).
    #[error("{0}")]
    Duplicate(String),

    /// A foreign key pointed at a row that no longer exists.
    #[error("{0}")]
    MissingReference(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Carried in `AppState` as `Arc<dyn LetterStore>`.
#[async_trait]
pub trait LetterStore: Send + Sync {
    async fn list_employees(&self) -> StoreResult<Vec<Employee>>;
    async fn get_employee(&self, employee_id: i32) -> StoreResult<Option<Employee>>;
    async fn find_employee_by_email(&self, email: &str) -> StoreResult<Option<Employee>>;
    async fn insert_employee(&self, employee: &NewEmployee) -> StoreResult<Employee>;
    /// Returns false when no such employee existed. Their letters go with them.
    async fn delete_employee(&self, employee_id: i32) -> StoreResult<bool>;

    async fn current_company(&self) -> StoreResult<Option<CompanyDetails>>;
    async fn insert_company_version(
        &self,
        company: &NewCompanyVersion,
    ) -> StoreResult<CompanyDetails>;

    async fn list_letters(&self) -> StoreResult<Vec<LetterSummary>>;
    async fn get_letter(&self, letter_id: i32) -> StoreResult<Option<LetterDetail>>;
    async fn find_letter_by_idempotency_key(&self, key: &str)
        -> StoreResult<Option<LetterDetail>>;
    async fn insert_letter(&self, letter: &NewLetter) -> StoreResult<LetterDetail>;
    /// Returns None when the letter does not exist.
    async fn update_letter(
        &self,
        letter_id: i32,
        update: &LetterUpdate,
    ) -> StoreResult<Option<LetterDetail>>;
}
