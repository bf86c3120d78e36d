//! Repository for the `price_parameters` and `price_parameter_lookups`
//! tables.

use sqlx::PgPool;
use teklif_core::error::CoreError;
use teklif_core::pricing::ParameterType;
use teklif_core::types::DbId;

use crate::error::StoreResult;
use crate::models::price_parameter::{
    CreatePriceParameter, CreatePriceParameterLookup, PriceParameter, PriceParameterLookup,
    UpdatePriceParameter,
};

const COLUMNS: &str = "id, code, name, parameter_type, fixed_value, form_field_code, \
    unit, description, created_at, updated_at";

const LOOKUP_COLUMNS: &str = "id, price_parameter_id, form_field_code, option_value, \
    price_value, currency, valid_from, valid_to, is_active, created_at";

/// Provides CRUD operations for pricing parameters and their lookup rows.
pub struct PriceParameterRepo;

impl PriceParameterRepo {
    /// Insert a parameter definition. Type-specific required fields are
    /// validated here: `fixed` needs `fixed_value`, `form_lookup` needs a
    /// form field code (explicit, or derivable from the code suffix).
    pub async fn create(
        pool: &PgPool,
        input: &CreatePriceParameter,
    ) -> StoreResult<PriceParameter> {
        validate_create(input)?;

        let query = format!(
            "INSERT INTO price_parameters
                (code, name, parameter_type, fixed_value, form_field_code, unit, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let parameter = sqlx::query_as::<_, PriceParameter>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.parameter_type.as_str())
            .bind(input.fixed_value)
            .bind(&input.form_field_code)
            .bind(&input.unit)
            .bind(&input.description)
            .fetch_one(pool)
            .await?;
        Ok(parameter)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PriceParameter>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM price_parameters WHERE id = $1");
        sqlx::query_as::<_, PriceParameter>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<PriceParameter>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM price_parameters WHERE code = $1");
        sqlx::query_as::<_, PriceParameter>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<PriceParameter>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM price_parameters ORDER BY code");
        sqlx::query_as::<_, PriceParameter>(&query).fetch_all(pool).await
    }

    /// Patch a parameter definition. Returns `None` when the id is unknown.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePriceParameter,
    ) -> Result<Option<PriceParameter>, sqlx::Error> {
        let query = format!(
            "UPDATE price_parameters SET
                name = COALESCE($2, name),
                fixed_value = COALESCE($3, fixed_value),
                form_field_code = COALESCE($4, form_field_code),
                unit = COALESCE($5, unit),
                description = COALESCE($6, description),
                updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PriceParameter>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.fixed_value)
            .bind(&input.form_field_code)
            .bind(&input.unit)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a parameter. Blocked while any formula or price setting
    /// references it.
    pub async fn delete(pool: &PgPool, id: DbId) -> StoreResult<()> {
        let (references,): (i64,) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM price_formula_parameters WHERE price_parameter_id = $1)
                  + (SELECT COUNT(*) FROM price_setting_parameters WHERE price_parameter_id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        if references > 0 {
            return Err(CoreError::Conflict(format!(
                "price parameter {id} is referenced by {references} formula/setting link(s)"
            ))
            .into());
        }

        let result = sqlx::query("DELETE FROM price_parameters WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("PriceParameter", id).into());
        }
        Ok(())
    }

    // ── Lookups ──────────────────────────────────────────────────────

    /// Add a lookup row to a `form_lookup` parameter.
    pub async fn add_lookup(
        pool: &PgPool,
        parameter_id: DbId,
        input: &CreatePriceParameterLookup,
    ) -> StoreResult<PriceParameterLookup> {
        let parameter = Self::find_by_id(pool, parameter_id)
            .await?
            .ok_or_else(|| CoreError::not_found("PriceParameter", parameter_id))?;
        if parameter.kind() != Some(ParameterType::FormLookup) {
            return Err(CoreError::Validation(format!(
                "parameter '{}' is not of type form_lookup",
                parameter.code
            ))
            .into());
        }

        let query = format!(
            "INSERT INTO price_parameter_lookups
                (price_parameter_id, form_field_code, option_value, price_value,
                 currency, valid_from, valid_to, is_active)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'TRY'), COALESCE($6, now()), $7,
                     COALESCE($8, true))
             RETURNING {LOOKUP_COLUMNS}"
        );
        let lookup = sqlx::query_as::<_, PriceParameterLookup>(&query)
            .bind(parameter_id)
            .bind(&input.form_field_code)
            .bind(&input.option_value)
            .bind(input.price_value)
            .bind(&input.currency)
            .bind(input.valid_from)
            .bind(input.valid_to)
            .bind(input.is_active)
            .fetch_one(pool)
            .await?;
        Ok(lookup)
    }

    /// List a parameter's lookup rows, newest validity first.
    pub async fn list_lookups(
        pool: &PgPool,
        parameter_id: DbId,
    ) -> Result<Vec<PriceParameterLookup>, sqlx::Error> {
        let query = format!(
            "SELECT {LOOKUP_COLUMNS} FROM price_parameter_lookups
             WHERE price_parameter_id = $1
             ORDER BY valid_from DESC, id DESC"
        );
        sqlx::query_as::<_, PriceParameterLookup>(&query)
            .bind(parameter_id)
            .fetch_all(pool)
            .await
    }

    /// Deactivate a lookup row (kept for audit; never matched again).
    pub async fn deactivate_lookup(pool: &PgPool, lookup_id: DbId) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE price_parameter_lookups SET is_active = false WHERE id = $1")
                .bind(lookup_id)
                .execute(pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("PriceParameterLookup", lookup_id).into());
        }
        Ok(())
    }
}

fn validate_create(input: &CreatePriceParameter) -> Result<(), CoreError> {
    if input.code.trim().is_empty() || input.name.trim().is_empty() {
        return Err(CoreError::Validation("code and name are required".into()));
    }
    match input.parameter_type {
        ParameterType::Fixed if input.fixed_value.is_none() => Err(CoreError::Validation(
            "parameter_type 'fixed' requires fixed_value".into(),
        )),
        ParameterType::FormLookup => {
            let derived = teklif_core::pricing::lookup_field_code(
                &teklif_core::pricing::ParameterDefinition {
                    code: input.code.clone(),
                    name: input.name.clone(),
                    parameter_type: ParameterType::FormLookup,
                    fixed_value: None,
                    form_field_code: input.form_field_code.clone(),
                },
            );
            if derived == input.code {
                Err(CoreError::Validation(
                    "parameter_type 'form_lookup' requires form_field_code \
                     (or a code with a _cost/_rate/_price suffix)"
                        .into(),
                ))
            } else {
                Ok(())
            }
        }
        _ => Ok(()),
    }
}
