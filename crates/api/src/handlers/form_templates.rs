//! Handlers for the `/form-templates` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use teklif_core::error::CoreError;
use teklif_core::types::DbId;
use teklif_db::models::form_template::{
    CreateFormField, CreateFormTemplate, FieldWithOptions, FormField, FormTemplate,
    NewTemplateVersion, TemplateWithFields, UpdateFormField,
};
use teklif_db::repositories::{FormFieldRepo, FormTemplateRepo};

use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::state::AppState;

/// POST /api/v1/form-templates
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateFormTemplate>,
) -> AppResult<(StatusCode, Json<FormTemplate>)> {
    if input.code.trim().is_empty() || input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "code and name are required".into(),
        )));
    }
    let template = FormTemplateRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /api/v1/form-templates
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<FormTemplate>>> {
    let templates = FormTemplateRepo::list(&state.pool).await?;
    Ok(Json(templates))
}

/// GET /api/v1/form-templates/active
pub async fn get_active(State(state): State<AppState>) -> AppResult<Json<TemplateWithFields>> {
    let active = FormTemplateRepo::find_active(&state.pool)
        .await?
        .ok_or_else(|| CoreError::not_found("FormTemplate", "active"))?;
    let with_fields = FormTemplateRepo::find_with_fields(&state.pool, active.id)
        .await?
        .ok_or_else(|| CoreError::not_found("FormTemplate", active.id))?;
    Ok(Json(with_fields))
}

/// GET /api/v1/form-templates/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TemplateWithFields>> {
    let template = FormTemplateRepo::find_with_fields(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("FormTemplate", id))?;
    Ok(Json(template))
}

/// POST /api/v1/form-templates/{id}/versions
pub async fn create_version(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<NewTemplateVersion>,
) -> AppResult<(StatusCode, Json<FormTemplate>)> {
    let next = FormTemplateRepo::create_new_version(&state.pool, id, &input).await?;
    Ok((StatusCode::CREATED, Json(next)))
}

/// POST /api/v1/form-templates/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<FormTemplate>> {
    let template = FormTemplateRepo::activate(&state.pool, id).await?;
    Ok(Json(template))
}

/// DELETE /api/v1/form-templates/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    FormTemplateRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/form-templates/{id}/fields
pub async fn list_fields(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<FormField>>> {
    let fields = FormFieldRepo::list_for_template(&state.pool, id).await?;
    Ok(Json(fields))
}

/// POST /api/v1/form-templates/{id}/fields
pub async fn create_field(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateFormField>,
) -> AppResult<(StatusCode, Json<FieldWithOptions>)> {
    if input.field_code.trim().is_empty() || input.field_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "field_code and field_name are required".into(),
        )));
    }
    let field = FormFieldRepo::create(&state.pool, id, &input).await?;
    Ok((StatusCode::CREATED, Json(field)))
}

/// POST /api/v1/form-templates/{id}/fields/bulk
pub async fn create_fields_bulk(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(inputs): Json<Vec<CreateFormField>>,
) -> AppResult<(StatusCode, Json<Vec<FieldWithOptions>>)> {
    let fields = FormFieldRepo::create_bulk(&state.pool, id, &inputs).await?;
    Ok((StatusCode::CREATED, Json(fields)))
}

/// PUT /api/v1/form-templates/{template_id}/fields/{id}
pub async fn update_field(
    State(state): State<AppState>,
    Path((_template_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateFormField>,
) -> AppResult<Json<FormField>> {
    let field = FormFieldRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("FormField", id))?;
    Ok(Json(field))
}

/// DELETE /api/v1/form-templates/{template_id}/fields/{id}
pub async fn delete_field(
    State(state): State<AppState>,
    Path((_template_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    FormFieldRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
