//! Repository for the `price_formulas` and `price_formula_parameters`
//! tables.

use sqlx::{PgConnection, PgPool};
use teklif_core::error::CoreError;
use teklif_core::types::DbId;

use crate::error::StoreResult;
use crate::models::price_formula::{
    CreatePriceFormula, FormulaWithParameters, NewFormulaVersion, PriceFormula,
};
use crate::models::price_parameter::PriceParameter;

const COLUMNS: &str = "id, code, name, description, formula_expression, version, \
    is_active, supersedes_id, created_by, created_at, updated_at";

const PARAMETER_COLUMNS: &str = "p.id, p.code, p.name, p.parameter_type, p.fixed_value, \
    p.form_field_code, p.unit, p.description, p.created_at, p.updated_at";

/// Provides CRUD and version-management operations for price formulas.
pub struct PriceFormulaRepo;

impl PriceFormulaRepo {
    /// Insert a formula and link its parameters (by code, in the given
    /// order) in one transaction. Unknown parameter codes fail the whole
    /// insert with `NotFound`.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePriceFormula,
    ) -> StoreResult<FormulaWithParameters> {
        if input.code.trim().is_empty()
            || input.name.trim().is_empty()
            || input.formula_expression.trim().is_empty()
        {
            return Err(CoreError::Validation(
                "code, name and formula_expression are required".into(),
            )
            .into());
        }

        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO price_formulas
                (code, name, description, formula_expression, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let formula = sqlx::query_as::<_, PriceFormula>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.formula_expression)
            .bind(&input.created_by)
            .fetch_one(&mut *tx)
            .await?;

        let mut parameters = Vec::with_capacity(input.parameter_codes.len());
        for (index, code) in input.parameter_codes.iter().enumerate() {
            let query = format!(
                "SELECT {PARAMETER_COLUMNS} FROM price_parameters p WHERE p.code = $1"
            );
            let parameter = sqlx::query_as::<_, PriceParameter>(&query)
                .bind(code)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| CoreError::not_found("PriceParameter", code))?;

            sqlx::query(
                "INSERT INTO price_formula_parameters
                    (price_formula_id, price_parameter_id, sort_order)
                 VALUES ($1, $2, $3)",
            )
            .bind(formula.id)
            .bind(parameter.id)
            .bind(index as i32)
            .execute(&mut *tx)
            .await?;

            parameters.push(parameter);
        }

        tx.commit().await?;
        Ok(FormulaWithParameters { formula, parameters })
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PriceFormula>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM price_formulas WHERE id = $1");
        sqlx::query_as::<_, PriceFormula>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<PriceFormula>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM price_formulas ORDER BY code, version DESC");
        sqlx::query_as::<_, PriceFormula>(&query).fetch_all(pool).await
    }

    /// The single active formula, if any.
    pub async fn find_active(pool: &PgPool) -> Result<Option<PriceFormula>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM price_formulas WHERE is_active LIMIT 1");
        sqlx::query_as::<_, PriceFormula>(&query).fetch_optional(pool).await
    }

    /// A formula with its parameter definitions in declared order.
    pub async fn find_with_parameters(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<FormulaWithParameters>, sqlx::Error> {
        let Some(formula) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let parameters = Self::parameters_for(pool, id).await?;
        Ok(Some(FormulaWithParameters { formula, parameters }))
    }

    /// Ordered parameter definitions linked to a formula.
    pub async fn parameters_for(
        pool: &PgPool,
        formula_id: DbId,
    ) -> Result<Vec<PriceParameter>, sqlx::Error> {
        let query = format!(
            "SELECT {PARAMETER_COLUMNS}
             FROM price_formula_parameters fp
             JOIN price_parameters p ON p.id = fp.price_parameter_id
             WHERE fp.price_formula_id = $1
             ORDER BY fp.sort_order, fp.id"
        );
        sqlx::query_as::<_, PriceParameter>(&query)
            .bind(formula_id)
            .fetch_all(pool)
            .await
    }

    /// Same as [`parameters_for`](Self::parameters_for), on a connection so
    /// price calculation can run mid-transaction.
    pub async fn parameters_on(
        conn: &mut PgConnection,
        formula_id: DbId,
    ) -> Result<Vec<PriceParameter>, sqlx::Error> {
        let query = format!(
            "SELECT {PARAMETER_COLUMNS}
             FROM price_formula_parameters fp
             JOIN price_parameters p ON p.id = fp.price_parameter_id
             WHERE fp.price_formula_id = $1
             ORDER BY fp.sort_order, fp.id"
        );
        sqlx::query_as::<_, PriceParameter>(&query)
            .bind(formula_id)
            .fetch_all(conn)
            .await
    }

    /// Create the next version of `id` in one transaction: deactivate the
    /// source, insert a copy with `version + 1` and `supersedes_id`, and
    /// copy the parameter links.
    pub async fn create_new_version(
        pool: &PgPool,
        id: DbId,
        input: &NewFormulaVersion,
    ) -> StoreResult<PriceFormula> {
        let mut tx = pool.begin().await?;
        let next = clone_version(&mut tx, id, input).await?;
        tx.commit().await?;
        Ok(next)
    }

    /// Activate exactly one formula, deactivating every other formula first
    /// (global single-active), in one transaction.
    pub async fn activate(pool: &PgPool, id: DbId) -> StoreResult<PriceFormula> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE price_formulas SET is_active = false, updated_at = now() WHERE is_active")
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "UPDATE price_formulas SET is_active = true, updated_at = now()
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let formula = sqlx::query_as::<_, PriceFormula>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::not_found("PriceFormula", id))?;

        tx.commit().await?;
        Ok(formula)
    }

    /// Delete a formula. Blocked while any quote or price setting
    /// references it.
    pub async fn delete(pool: &PgPool, id: DbId) -> StoreResult<()> {
        let (references,): (i64,) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM quotes WHERE price_formula_id = $1)
                  + (SELECT COUNT(*) FROM price_settings WHERE price_formula_id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        if references > 0 {
            return Err(CoreError::Conflict(format!(
                "price formula {id} is referenced by {references} quote(s)/setting(s)"
            ))
            .into());
        }

        let result = sqlx::query("DELETE FROM price_formulas WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("PriceFormula", id).into());
        }
        Ok(())
    }
}

/// Clone `source_id` into a new inactive row with `version + 1`, copying
/// parameter links. Shared with price-setting versioning, which deep-copies
/// the bundled formula.
pub(crate) async fn clone_version(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    source_id: DbId,
    input: &NewFormulaVersion,
) -> StoreResult<PriceFormula> {
    let query = format!("SELECT {COLUMNS} FROM price_formulas WHERE id = $1 FOR UPDATE");
    let source = sqlx::query_as::<_, PriceFormula>(&query)
        .bind(source_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| CoreError::not_found("PriceFormula", source_id))?;

    sqlx::query("UPDATE price_formulas SET is_active = false, updated_at = now() WHERE id = $1")
        .bind(source_id)
        .execute(&mut **tx)
        .await?;

    let query = format!(
        "INSERT INTO price_formulas
            (code, name, description, formula_expression, version, is_active,
             supersedes_id, created_by)
         VALUES ($1, $2, $3, $4, $5, false, $6, $7)
         RETURNING {COLUMNS}"
    );
    let next = sqlx::query_as::<_, PriceFormula>(&query)
        .bind(&source.code)
        .bind(input.name.as_ref().unwrap_or(&source.name))
        .bind(input.description.as_ref().or(source.description.as_ref()))
        .bind(
            input
                .formula_expression
                .as_ref()
                .unwrap_or(&source.formula_expression),
        )
        .bind(source.version + 1)
        .bind(source.id)
        .bind(&input.created_by)
        .fetch_one(&mut **tx)
        .await?;

    sqlx::query(
        "INSERT INTO price_formula_parameters (price_formula_id, price_parameter_id, sort_order)
         SELECT $2, price_parameter_id, sort_order
         FROM price_formula_parameters WHERE price_formula_id = $1",
    )
    .bind(source_id)
    .bind(next.id)
    .execute(&mut **tx)
    .await?;

    Ok(next)
}
