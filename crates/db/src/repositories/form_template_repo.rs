//! Repository for the `form_templates` table and its field/option tree.

use sqlx::{PgConnection, PgPool};
use teklif_core::error::CoreError;
use teklif_core::types::DbId;

use crate::error::StoreResult;
use crate::models::form_template::{
    CreateFormTemplate, FieldWithOptions, FormField, FormFieldOption, FormTemplate,
    NewTemplateVersion, TemplateWithFields,
};

/// Column list for form_templates queries.
const COLUMNS: &str = "id, code, name, description, version, is_active, \
    supersedes_id, created_by, created_at, updated_at";

const FIELD_COLUMNS: &str = "id, form_template_id, field_code, field_name, field_type, \
    sort_order, is_required, validation_rule, default_value, created_at";

/// Provides CRUD and version-management operations for form templates.
pub struct FormTemplateRepo;

impl FormTemplateRepo {
    /// Insert a new template. Inactive unless explicitly requested,
    /// version 1 unless explicitly set.
    pub async fn create(
        pool: &PgPool,
        input: &CreateFormTemplate,
    ) -> Result<FormTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_templates (code, name, description, version, is_active, created_by)
             VALUES ($1, $2, $3, COALESCE($4, 1), COALESCE($5, false), $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormTemplate>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.version)
            .bind(input.is_active)
            .bind(&input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a template by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FormTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM form_templates WHERE id = $1");
        sqlx::query_as::<_, FormTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all templates, newest version chains first.
    pub async fn list(pool: &PgPool) -> Result<Vec<FormTemplate>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM form_templates ORDER BY code, version DESC");
        sqlx::query_as::<_, FormTemplate>(&query).fetch_all(pool).await
    }

    /// The single active template, if any.
    pub async fn find_active(pool: &PgPool) -> Result<Option<FormTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM form_templates WHERE is_active LIMIT 1");
        sqlx::query_as::<_, FormTemplate>(&query).fetch_optional(pool).await
    }

    /// Create the next version of `id` in one transaction: deactivate the
    /// source, insert a copy with `version + 1` and `supersedes_id`, and
    /// structurally copy its fields and options.
    pub async fn create_new_version(
        pool: &PgPool,
        id: DbId,
        input: &NewTemplateVersion,
    ) -> StoreResult<FormTemplate> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM form_templates WHERE id = $1 FOR UPDATE");
        let source = sqlx::query_as::<_, FormTemplate>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::not_found("FormTemplate", id))?;

        sqlx::query("UPDATE form_templates SET is_active = false, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO form_templates
                (code, name, description, version, is_active, supersedes_id, created_by)
             VALUES ($1, $2, $3, $4, false, $5, $6)
             RETURNING {COLUMNS}"
        );
        let next = sqlx::query_as::<_, FormTemplate>(&query)
            .bind(&source.code)
            .bind(input.name.as_ref().unwrap_or(&source.name))
            .bind(input.description.as_ref().or(source.description.as_ref()))
            .bind(source.version + 1)
            .bind(source.id)
            .bind(&input.created_by)
            .fetch_one(&mut *tx)
            .await?;

        copy_fields(&mut tx, source.id, next.id).await?;

        tx.commit().await?;
        Ok(next)
    }

    /// Activate exactly one template, deactivating every other template
    /// first (global single-active, deliberately not per-code), in one
    /// transaction.
    pub async fn activate(pool: &PgPool, id: DbId) -> StoreResult<FormTemplate> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE form_templates SET is_active = false, updated_at = now() WHERE is_active")
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "UPDATE form_templates SET is_active = true, updated_at = now()
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, FormTemplate>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::not_found("FormTemplate", id))?;

        tx.commit().await?;
        Ok(template)
    }

    /// Delete a template. Blocked while any quote references it.
    pub async fn delete(pool: &PgPool, id: DbId) -> StoreResult<()> {
        let (quote_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM quotes WHERE form_template_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;
        if quote_count > 0 {
            return Err(CoreError::Conflict(format!(
                "form template {id} is referenced by {quote_count} quote(s)"
            ))
            .into());
        }

        let result = sqlx::query("DELETE FROM form_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("FormTemplate", id).into());
        }
        Ok(())
    }

    /// A template with its ordered fields, each carrying its ordered active
    /// options. Fields and options are read in one joined query (no N+1).
    pub async fn find_with_fields(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TemplateWithFields>, sqlx::Error> {
        let Some(template) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let query = format!("SELECT {FIELD_COLUMNS} FROM form_fields \
             WHERE form_template_id = $1 ORDER BY sort_order, id");
        let fields = sqlx::query_as::<_, FormField>(&query)
            .bind(id)
            .fetch_all(pool)
            .await?;

        let options = sqlx::query_as::<_, FormFieldOption>(
            "SELECT o.id, o.form_field_id, o.option_value, o.option_label, o.sort_order,
                    o.is_active, o.price_value, o.created_at
             FROM form_field_options o
             JOIN form_fields f ON f.id = o.form_field_id
             WHERE f.form_template_id = $1 AND o.is_active
             ORDER BY o.form_field_id, o.sort_order, o.id",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        let fields = fields
            .into_iter()
            .map(|field| {
                let options = options
                    .iter()
                    .filter(|o| o.form_field_id == field.id)
                    .cloned()
                    .collect();
                FieldWithOptions { field, options }
            })
            .collect();

        Ok(Some(TemplateWithFields { template, fields }))
    }

    /// Field codes of a template, for filtering submitted form-data keys.
    /// Takes a connection so quote creation can call it mid-transaction.
    pub async fn field_codes(
        conn: &mut PgConnection,
        template_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT field_code FROM form_fields WHERE form_template_id = $1")
                .bind(template_id)
                .fetch_all(conn)
                .await?;
        Ok(rows.into_iter().map(|(code,)| code).collect())
    }
}

/// Copy all fields and options of `source_id` onto `target_id`.
async fn copy_fields(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    source_id: DbId,
    target_id: DbId,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO form_fields
            (form_template_id, field_code, field_name, field_type, sort_order,
             is_required, validation_rule, default_value)
         SELECT $2, field_code, field_name, field_type, sort_order,
                is_required, validation_rule, default_value
         FROM form_fields WHERE form_template_id = $1",
    )
    .bind(source_id)
    .bind(target_id)
    .execute(&mut **tx)
    .await?;

    // Options are re-parented by joining old and new fields on field_code.
    sqlx::query(
        "INSERT INTO form_field_options
            (form_field_id, option_value, option_label, sort_order, is_active, price_value)
         SELECT nf.id, o.option_value, o.option_label, o.sort_order, o.is_active, o.price_value
         FROM form_fields sf
         JOIN form_field_options o ON o.form_field_id = sf.id
         JOIN form_fields nf ON nf.form_template_id = $2 AND nf.field_code = sf.field_code
         WHERE sf.form_template_id = $1",
    )
    .bind(source_id)
    .bind(target_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
