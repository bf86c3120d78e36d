//! Repository for the `price_settings` and `price_setting_parameters`
//! tables — named, versioned pricing-configuration bundles.

use sqlx::PgPool;
use teklif_core::error::CoreError;
use teklif_core::types::DbId;

use crate::error::StoreResult;
use crate::models::price_formula::NewFormulaVersion;
use crate::models::price_parameter::PriceParameter;
use crate::models::price_setting::{
    CreatePriceSetting, NewSettingVersion, PriceSetting, SettingWithParameters,
};
use crate::repositories::price_formula_repo;

const COLUMNS: &str = "id, code, name, description, version, is_active, supersedes_id, \
    form_template_id, price_formula_id, created_by, created_at, updated_at";

const PARAMETER_COLUMNS: &str = "p.id, p.code, p.name, p.parameter_type, p.fixed_value, \
    p.form_field_code, p.unit, p.description, p.created_at, p.updated_at";

/// Provides CRUD, activation, and deep-copy versioning for price settings.
pub struct PriceSettingRepo;

impl PriceSettingRepo {
    /// Insert a bundle and link its ordered parameter set (by code) in one
    /// transaction. The referenced formula must exist.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePriceSetting,
    ) -> StoreResult<SettingWithParameters> {
        if input.code.trim().is_empty() || input.name.trim().is_empty() {
            return Err(CoreError::Validation("code and name are required".into()).into());
        }

        let mut tx = pool.begin().await?;

        let formula_exists: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM price_formulas WHERE id = $1")
                .bind(input.price_formula_id)
                .fetch_optional(&mut *tx)
                .await?;
        if formula_exists.is_none() {
            return Err(CoreError::not_found("PriceFormula", input.price_formula_id).into());
        }

        let query = format!(
            "INSERT INTO price_settings
                (code, name, description, form_template_id, price_formula_id, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let setting = sqlx::query_as::<_, PriceSetting>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.form_template_id)
            .bind(input.price_formula_id)
            .bind(&input.created_by)
            .fetch_one(&mut *tx)
            .await?;

        let mut parameters = Vec::with_capacity(input.parameter_codes.len());
        for (index, code) in input.parameter_codes.iter().enumerate() {
            let query =
                format!("SELECT {PARAMETER_COLUMNS} FROM price_parameters p WHERE p.code = $1");
            let parameter = sqlx::query_as::<_, PriceParameter>(&query)
                .bind(code)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| CoreError::not_found("PriceParameter", code))?;

            sqlx::query(
                "INSERT INTO price_setting_parameters
                    (price_setting_id, price_parameter_id, sort_order)
                 VALUES ($1, $2, $3)",
            )
            .bind(setting.id)
            .bind(parameter.id)
            .bind(index as i32)
            .execute(&mut *tx)
            .await?;

            parameters.push(parameter);
        }

        tx.commit().await?;
        Ok(SettingWithParameters {
            setting,
            parameters,
        })
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PriceSetting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM price_settings WHERE id = $1");
        sqlx::query_as::<_, PriceSetting>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<PriceSetting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM price_settings ORDER BY code, version DESC");
        sqlx::query_as::<_, PriceSetting>(&query).fetch_all(pool).await
    }

    /// The single active bundle, if any.
    pub async fn find_active(pool: &PgPool) -> Result<Option<PriceSetting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM price_settings WHERE is_active LIMIT 1");
        sqlx::query_as::<_, PriceSetting>(&query).fetch_optional(pool).await
    }

    /// A bundle with its ordered parameter definitions.
    pub async fn find_with_parameters(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SettingWithParameters>, sqlx::Error> {
        let Some(setting) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let query = format!(
            "SELECT {PARAMETER_COLUMNS}
             FROM price_setting_parameters sp
             JOIN price_parameters p ON p.id = sp.price_parameter_id
             WHERE sp.price_setting_id = $1
             ORDER BY sp.sort_order, sp.id"
        );
        let parameters = sqlx::query_as::<_, PriceParameter>(&query)
            .bind(id)
            .fetch_all(pool)
            .await?;
        Ok(Some(SettingWithParameters {
            setting,
            parameters,
        }))
    }

    /// Activate exactly one bundle, deactivating every other bundle first,
    /// in one transaction.
    pub async fn activate(pool: &PgPool, id: DbId) -> StoreResult<PriceSetting> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE price_settings SET is_active = false, updated_at = now() WHERE is_active")
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "UPDATE price_settings SET is_active = true, updated_at = now()
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let setting = sqlx::query_as::<_, PriceSetting>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::not_found("PriceSetting", id))?;

        tx.commit().await?;
        Ok(setting)
    }

    /// Create the next version of a bundle in one transaction.
    ///
    /// The bundled formula is deep-copied into a fresh inactive formula row
    /// (with its parameter links), so editing the new version never mutates
    /// the old one. Parameter definitions stay shared — their codes are
    /// globally unique — but the set-membership rows are copied.
    pub async fn create_new_version(
        pool: &PgPool,
        id: DbId,
        input: &NewSettingVersion,
    ) -> StoreResult<PriceSetting> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM price_settings WHERE id = $1 FOR UPDATE");
        let source = sqlx::query_as::<_, PriceSetting>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::not_found("PriceSetting", id))?;

        sqlx::query("UPDATE price_settings SET is_active = false, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let copied_formula = price_formula_repo::clone_version(
            &mut tx,
            source.price_formula_id,
            &NewFormulaVersion {
                created_by: input.created_by.clone(),
                ..Default::default()
            },
        )
        .await?;

        let query = format!(
            "INSERT INTO price_settings
                (code, name, description, version, is_active, supersedes_id,
                 form_template_id, price_formula_id, created_by)
             VALUES ($1, $2, $3, $4, false, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        let next = sqlx::query_as::<_, PriceSetting>(&query)
            .bind(&source.code)
            .bind(input.name.as_ref().unwrap_or(&source.name))
            .bind(input.description.as_ref().or(source.description.as_ref()))
            .bind(source.version + 1)
            .bind(source.id)
            .bind(source.form_template_id)
            .bind(copied_formula.id)
            .bind(&input.created_by)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO price_setting_parameters (price_setting_id, price_parameter_id, sort_order)
             SELECT $2, price_parameter_id, sort_order
             FROM price_setting_parameters WHERE price_setting_id = $1",
        )
        .bind(source.id)
        .bind(next.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(next)
    }

    /// Delete a bundle (its parameter links cascade).
    pub async fn delete(pool: &PgPool, id: DbId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM price_settings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("PriceSetting", id).into());
        }
        Ok(())
    }
}
