//! Request field checks shared by the handlers. Length limits mirror the
//! VARCHAR sizes in the migrations and count characters, as PostgreSQL does.

use crate::errors::AppError;
use crate::export::assets::is_public_path;

pub const NAME_MAX: usize = 255;
pub const DEPARTMENT_MAX: usize = 100;
pub const EMAIL_MAX: usize = 255;
pub const SUBJECT_MAX: usize = 500;
pub const IMAGE_PATH_MAX: usize = 500;

/// Trimmed value, or None when absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Fails with the labels of every absent field, in order.
pub fn require_fields(fields: &[(&str, bool)]) -> Result<(), AppError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(label, _)| *label)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::Validation(format!(
        "Missing required fields: {}",
        missing.join(", ")
    )))
}

pub fn check_max_len(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Image paths must point inside the public directory (e.g.
/// `/images/logo.png`) so the HTML and Word renderers load the same file.
pub fn check_image_path(field: &str, path: &str) -> Result<(), AppError> {
    check_max_len(field, path, IMAGE_PATH_MAX)?;
    if !is_public_path(path) {
        return Err(AppError::Validation(format!(
            "{field} must be a path under the public directory, such as /images/logo.png"
        )));
    }
    Ok(())
}
