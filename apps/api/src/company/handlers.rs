use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::company::{CompanyDetails, NewCompanyVersion};
use crate::state::AppState;
use crate::validation::{check_image_path, check_max_len, non_blank, require_fields, NAME_MAX};

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub founder_name: Option<String>,
    pub founder_title: Option<String>,
    pub logo_url: Option<String>,
    pub founder_signature_url: Option<String>,
    pub seal_url: Option<String>,
}

fn image_path(field: &str, value: Option<&str>) -> Result<Option<String>, AppError> {
    let path = non_blank(value);
    if let Some(path) = &path {
        check_image_path(field, path)?;
    }
    Ok(path)
}

impl UpdateCompanyRequest {
    fn into_new_version(self) -> Result<NewCompanyVersion, AppError> {
        let name = non_blank(self.name.as_deref());
        let address = non_blank(self.address.as_deref());
        let founder_name = non_blank(self.founder_name.as_deref());
        require_fields(&[
            ("name", name.is_some()),
            ("address", address.is_some()),
            ("founder_name", founder_name.is_some()),
        ])?;
        let (name, address, founder_name) = (
            name.unwrap_or_default(),
            address.unwrap_or_default(),
            founder_name.unwrap_or_default(),
        );
        let founder_title =
            non_blank(self.founder_title.as_deref()).unwrap_or_else(|| "Founder".to_string());

        check_max_len("name", &name, NAME_MAX)?;
        check_max_len("founder_name", &founder_name, NAME_MAX)?;
        check_max_len("founder_title", &founder_title, NAME_MAX)?;

        Ok(NewCompanyVersion {
            name,
            address,
            founder_name,
            founder_title,
            logo_url: image_path("logo_url", self.logo_url.as_deref())?,
            founder_signature_url: image_path(
                "founder_signature_url",
                self.founder_signature_url.as_deref(),
            )?,
            seal_url: image_path("seal_url", self.seal_url.as_deref())?,
        })
    }
}

/// GET /api/company
pub async fn handle_get_company(
    State(state): State<AppState>,
) -> Result<Json<CompanyDetails>, AppError> {
    state
        .store
        .current_company()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Company details not found".to_string()))
}

/// PUT /api/company
///
/// Appends a new version. Letters generated earlier keep the version they
/// were rendered with.
pub async fn handle_update_company(
    State(state): State<AppState>,
    AppJson(req): AppJson<UpdateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyDetails>), AppError> {
    let next = req.into_new_version()?;
    let company = state.store.insert_company_version(&next).await?;
    Ok((StatusCode::CREATED, Json(company)))
}
