//! Repository for the `form_fields` and `form_field_options` tables.

use sqlx::{PgConnection, PgPool};
use teklif_core::error::CoreError;
use teklif_core::types::DbId;

use crate::error::StoreResult;
use crate::models::form_template::{
    CreateFormField, FieldWithOptions, FormField, FormFieldOption, UpdateFormField,
};

const COLUMNS: &str = "id, form_template_id, field_code, field_name, field_type, \
    sort_order, is_required, validation_rule, default_value, created_at";

const OPTION_COLUMNS: &str = "id, form_field_id, option_value, option_label, \
    sort_order, is_active, price_value, created_at";

/// Provides CRUD operations for form fields and their inline options.
pub struct FormFieldRepo;

impl FormFieldRepo {
    /// Insert one field with its inline options in one transaction.
    /// The template must exist.
    pub async fn create(
        pool: &PgPool,
        template_id: DbId,
        input: &CreateFormField,
    ) -> StoreResult<FieldWithOptions> {
        let mut tx = pool.begin().await?;
        require_template(&mut tx, template_id).await?;
        let created = insert_field(&mut tx, template_id, input).await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Insert many fields (each with inline options) in one transaction.
    /// Any failure rolls back every field.
    pub async fn create_bulk(
        pool: &PgPool,
        template_id: DbId,
        inputs: &[CreateFormField],
    ) -> StoreResult<Vec<FieldWithOptions>> {
        let mut tx = pool.begin().await?;
        require_template(&mut tx, template_id).await?;

        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            created.push(insert_field(&mut tx, template_id, input).await?);
        }

        tx.commit().await?;
        Ok(created)
    }

    /// List a template's fields in display order.
    pub async fn list_for_template(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Vec<FormField>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_fields
             WHERE form_template_id = $1 ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, FormField>(&query)
            .bind(template_id)
            .fetch_all(pool)
            .await
    }

    /// Patch a field. Returns `None` when the id is unknown.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFormField,
    ) -> Result<Option<FormField>, sqlx::Error> {
        let query = format!(
            "UPDATE form_fields SET
                field_name = COALESCE($2, field_name),
                field_type = COALESCE($3, field_type),
                sort_order = COALESCE($4, sort_order),
                is_required = COALESCE($5, is_required),
                validation_rule = COALESCE($6, validation_rule),
                default_value = COALESCE($7, default_value)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormField>(&query)
            .bind(id)
            .bind(&input.field_name)
            .bind(&input.field_type)
            .bind(input.sort_order)
            .bind(input.is_required)
            .bind(&input.validation_rule)
            .bind(&input.default_value)
            .fetch_optional(pool)
            .await
    }

    /// Delete a field (options cascade).
    pub async fn delete(pool: &PgPool, id: DbId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM form_fields WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("FormField", id).into());
        }
        Ok(())
    }
}

async fn require_template(conn: &mut PgConnection, template_id: DbId) -> StoreResult<()> {
    let exists: Option<(DbId,)> =
        sqlx::query_as("SELECT id FROM form_templates WHERE id = $1")
            .bind(template_id)
            .fetch_optional(conn)
            .await?;
    if exists.is_none() {
        return Err(CoreError::not_found("FormTemplate", template_id).into());
    }
    Ok(())
}

async fn insert_field(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    template_id: DbId,
    input: &CreateFormField,
) -> StoreResult<FieldWithOptions> {
    if input.field_code.trim().is_empty() || input.field_name.trim().is_empty() {
        return Err(CoreError::Validation(
            "field_code and field_name are required".into(),
        )
        .into());
    }

    let query = format!(
        "INSERT INTO form_fields
            (form_template_id, field_code, field_name, field_type, sort_order,
             is_required, validation_rule, default_value)
         VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, false), $7, $8)
         RETURNING {COLUMNS}"
    );
    let field = sqlx::query_as::<_, FormField>(&query)
        .bind(template_id)
        .bind(&input.field_code)
        .bind(&input.field_name)
        .bind(&input.field_type)
        .bind(input.sort_order)
        .bind(input.is_required)
        .bind(&input.validation_rule)
        .bind(&input.default_value)
        .fetch_one(&mut **tx)
        .await?;

    let mut options = Vec::with_capacity(input.options.len());
    for (index, option) in input.options.iter().enumerate() {
        let query = format!(
            "INSERT INTO form_field_options
                (form_field_id, option_value, option_label, sort_order, is_active, price_value)
             VALUES ($1, $2, $3, COALESCE($4, $5), COALESCE($6, true), $7)
             RETURNING {OPTION_COLUMNS}"
        );
        let created = sqlx::query_as::<_, FormFieldOption>(&query)
            .bind(field.id)
            .bind(&option.option_value)
            .bind(&option.option_label)
            .bind(option.sort_order)
            .bind(index as i32)
            .bind(option.is_active)
            .bind(option.price_value)
            .fetch_one(&mut **tx)
            .await?;
        options.push(created);
    }

    Ok(FieldWithOptions { field, options })
}
