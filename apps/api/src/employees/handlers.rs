//! Axum route handlers for the Employees API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::employee::{Employee, NewEmployee};
use crate::state::AppState;
use crate::validation::{
    check_max_len, non_blank, require_fields, DEPARTMENT_MAX, EMAIL_MAX, NAME_MAX,
};

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
}

/// Trims the three fields and rejects blanks, values longer than their
/// columns, or an email without `@`.
pub fn validate_new_employee(
    name: Option<&str>,
    department: Option<&str>,
    email: Option<&str>,
) -> Result<NewEmployee, AppError> {
    let (name, department, email) = (non_blank(name), non_blank(department), non_blank(email));
    require_fields(&[
        ("name", name.is_some()),
        ("department", department.is_some()),
        ("email", email.is_some()),
    ])?;
    let (name, department, email) = (
        name.unwrap_or_default(),
        department.unwrap_or_default(),
        email.unwrap_or_default(),
    );

    check_max_len("name", &name, NAME_MAX)?;
    check_max_len("department", &department, DEPARTMENT_MAX)?;
    check_max_len("email", &email, EMAIL_MAX)?;
    if !email.contains('@') {
        return Err(AppError::Validation(format!("Invalid email address: {email}")));
    }

    Ok(NewEmployee {
        name,
        department,
        email,
    })
}

/// GET /api/employees
pub async fn handle_list_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<Employee>>, AppError> {
    Ok(Json(state.store.list_employees().await?))
}

/// POST /api/employees
pub async fn handle_create_employee(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    let new_employee = validate_new_employee(
        req.name.as_deref(),
        req.department.as_deref(),
        req.email.as_deref(),
    )?;
    let employee = state.store.insert_employee(&new_employee).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// DELETE /api/employees/:id
///
/// Removes the employee and, through the foreign key, all of their letters.
pub async fn handle_delete_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_employee(employee_id).await? {
        return Err(AppError::NotFound(format!("Employee {employee_id} not found")));
    }
    info!("Deleted employee {employee_id} and their letters");
    Ok(StatusCode::NO_CONTENT)
}
