pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::company::handlers as company;
use crate::employees::handlers as employees;
use crate::export::handlers as export;
use crate::letters::handlers as letters;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let public = ServeDir::new(state.assets.root());

    Router::new()
        .route("/health", get(health::health_handler))
        // Employees
        .route(
            "/api/employees",
            get(employees::handle_list_employees).post(employees::handle_create_employee),
        )
        .route("/api/employees/:id", delete(employees::handle_delete_employee))
        // Company branding
        .route(
            "/api/company",
            get(company::handle_get_company).put(company::handle_update_company),
        )
        // Letters
        .route("/api/letters", get(letters::handle_list_letters))
        .route(
            "/api/letters/:id",
            get(letters::handle_get_letter).put(letters::handle_update_letter),
        )
        .route("/api/generate-letter", post(letters::handle_generate_letter))
        .route("/api/generate", post(letters::handle_generate_letter))
        // Export
        .route("/api/download/pdf/:id", get(export::handle_download_pdf))
        .route("/api/download/docx/:id", get(export::handle_download_docx))
        .route("/api/download/word/:id", get(export::handle_download_docx))
        .fallback_service(public)
        .with_state(state)
}
