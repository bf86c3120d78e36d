//! Repository for the `quotes`, `quote_form_data`, and
//! `quote_price_details` tables.
//!
//! Quote creation and update are single transactions spanning the quote
//! row, its EAV form answers, and the price audit trail; nothing outside
//! the transaction ever observes a partial quote.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use teklif_core::error::CoreError;
use teklif_core::quote_id;
use teklif_core::types::DbId;

use crate::error::StoreResult;
use crate::models::price_formula::PriceFormula;
use crate::models::quote::{
    CreateQuote, PriceStatus, Quote, QuoteFormData, QuoteListParams, QuotePriceDetail,
    QuoteStatistics, QuoteStatus, QuoteWithDetails, StatisticsParams, StatusBucket, UpdateQuote,
};
use crate::pricing::{self, CalculationOutcome};
use crate::repositories::form_template_repo::FormTemplateRepo;

const COLUMNS: &str = "id, customer_name, customer_email, customer_phone, company_name, \
    form_template_id, price_formula_id, status, calculated_price, manual_price, \
    manual_price_reason, final_price, price_status, price_calculated_at, approved_at, \
    approved_by, notes, created_at, updated_at";

const FORMULA_COLUMNS: &str = "id, code, name, description, formula_expression, version, \
    is_active, supersedes_id, created_by, created_at, updated_at";

/// Orchestrates quote creation, recalculation, and the status/price
/// lifecycle.
pub struct QuoteRepo;

impl QuoteRepo {
    /// Allocate the next quote id for today: `TKF-YYYYMMDD-NNNN`.
    ///
    /// Backed by an atomic per-day upsert counter, safe under concurrent
    /// creation (unlike counting existing rows).
    pub async fn next_quote_id(conn: &mut PgConnection) -> Result<String, sqlx::Error> {
        let today = Utc::now().date_naive();
        let key = quote_id::day_key(today);
        let (counter,): (i32,) = sqlx::query_as(
            "INSERT INTO quote_id_counters (day_key, counter) VALUES ($1, 1)
             ON CONFLICT (day_key)
             DO UPDATE SET counter = quote_id_counters.counter + 1
             RETURNING counter",
        )
        .bind(&key)
        .fetch_one(conn)
        .await?;
        Ok(quote_id::format_id(today, counter as u32))
    }

    /// Create a quote in one transaction: generate the id, insert the row
    /// with `status = 'new'`, store template-validated form answers, and —
    /// when a formula resolves and form data was submitted — run the price
    /// calculation and persist its audit trail.
    pub async fn create(pool: &PgPool, input: &CreateQuote) -> StoreResult<QuoteWithDetails> {
        if input.customer_name.trim().is_empty() || input.customer_email.trim().is_empty() {
            return Err(CoreError::Validation(
                "customer_name and customer_email are required".into(),
            )
            .into());
        }

        let mut tx = pool.begin().await?;

        let template_id =
            resolve_template(&mut tx, input.form_template_id, input.form_data.is_some()).await?;
        let formula = resolve_formula(&mut tx, input.price_formula_id).await?;

        let id = Self::next_quote_id(&mut tx).await?;

        let query = format!(
            "INSERT INTO quotes
                (id, customer_name, customer_email, customer_phone, company_name,
                 form_template_id, price_formula_id, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        let mut quote = sqlx::query_as::<_, Quote>(&query)
            .bind(&id)
            .bind(&input.customer_name)
            .bind(&input.customer_email)
            .bind(&input.customer_phone)
            .bind(&input.company_name)
            .bind(template_id)
            .bind(formula.as_ref().map(|f| f.id))
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        let mut form_data = Vec::new();
        if let (Some(submitted), Some(template_id)) = (&input.form_data, template_id) {
            form_data = store_form_data(&mut tx, &id, template_id, submitted).await?;
        }

        let mut price_details = Vec::new();
        if let (Some(formula), Some(submitted)) = (&formula, &input.form_data) {
            let outcome = pricing::calculate(&mut tx, formula, submitted).await?;
            price_details = store_price_details(&mut tx, &id, &outcome).await?;

            let query = format!(
                "UPDATE quotes SET
                    calculated_price = $2, final_price = $2,
                    price_status = 'current', price_calculated_at = now(),
                    updated_at = now()
                 WHERE id = $1 RETURNING {COLUMNS}"
            );
            quote = sqlx::query_as::<_, Quote>(&query)
                .bind(&id)
                .bind(outcome.total_price)
                .fetch_one(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(QuoteWithDetails {
            quote,
            form_data,
            price_details,
        })
    }

    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Quote>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quotes WHERE id = $1");
        sqlx::query_as::<_, Quote>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A quote with its form answers and price audit trail.
    pub async fn find_with_details(
        pool: &PgPool,
        id: &str,
    ) -> Result<Option<QuoteWithDetails>, sqlx::Error> {
        let Some(quote) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let form_data = sqlx::query_as::<_, QuoteFormData>(
            "SELECT id, quote_id, field_code, field_value FROM quote_form_data
             WHERE quote_id = $1 ORDER BY field_code",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        let price_details = sqlx::query_as::<_, QuotePriceDetail>(
            "SELECT id, quote_id, parameter_code, parameter_name, parameter_value,
                    source, sort_order
             FROM quote_price_details WHERE quote_id = $1 ORDER BY sort_order, id",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(Some(QuoteWithDetails {
            quote,
            form_data,
            price_details,
        }))
    }

    /// List quotes, newest first, optionally filtered by status.
    pub async fn list(pool: &PgPool, params: &QuoteListParams) -> Result<Vec<Quote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM quotes
             WHERE ($1::text IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Quote>(&query)
            .bind(&params.status)
            .bind(params.limit.unwrap_or(100))
            .bind(params.offset.unwrap_or(0))
            .fetch_all(pool)
            .await
    }

    /// Update a quote in one transaction. Supplying `form_data` replaces
    /// the stored answers and recalculates the price; a manual override
    /// survives recalculation (`calculated_price` is refreshed for audit,
    /// `final_price` stays at `manual_price` until explicitly cleared).
    pub async fn update(
        pool: &PgPool,
        id: &str,
        input: &UpdateQuote,
    ) -> StoreResult<QuoteWithDetails> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM quotes WHERE id = $1 FOR UPDATE");
        let existing = sqlx::query_as::<_, Quote>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::not_found("Quote", id))?;

        let query = format!(
            "UPDATE quotes SET
                customer_name = COALESCE($2, customer_name),
                customer_email = COALESCE($3, customer_email),
                customer_phone = COALESCE($4, customer_phone),
                company_name = COALESCE($5, company_name),
                notes = COALESCE($6, notes),
                updated_at = now()
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let mut quote = sqlx::query_as::<_, Quote>(&query)
            .bind(id)
            .bind(&input.customer_name)
            .bind(&input.customer_email)
            .bind(&input.customer_phone)
            .bind(&input.company_name)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        let mut form_data = Vec::new();
        let mut price_details = Vec::new();
        if let Some(submitted) = &input.form_data {
            sqlx::query("DELETE FROM quote_form_data WHERE quote_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM quote_price_details WHERE quote_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            let template_id = match existing.form_template_id {
                Some(tid) => Some(tid),
                None => resolve_template(&mut tx, None, true).await?,
            };
            if let Some(template_id) = template_id {
                form_data = store_form_data(&mut tx, id, template_id, submitted).await?;
            }

            let formula = resolve_formula(&mut tx, existing.price_formula_id).await?;
            if let Some(formula) = &formula {
                let outcome = pricing::calculate(&mut tx, formula, submitted).await?;
                price_details = store_price_details(&mut tx, id, &outcome).await?;

                // Manual override wins until explicitly cleared; the fresh
                // calculation is still recorded for audit.
                let manual = quote.price_status == PriceStatus::Manual.as_str();
                let query = format!(
                    "UPDATE quotes SET
                        calculated_price = $2,
                        final_price = CASE WHEN $3 THEN final_price ELSE $2 END,
                        price_calculated_at = now(),
                        updated_at = now()
                     WHERE id = $1 RETURNING {COLUMNS}"
                );
                quote = sqlx::query_as::<_, Quote>(&query)
                    .bind(id)
                    .bind(outcome.total_price)
                    .bind(manual)
                    .fetch_one(&mut *tx)
                    .await?;
            }
        } else {
            form_data = sqlx::query_as::<_, QuoteFormData>(
                "SELECT id, quote_id, field_code, field_value FROM quote_form_data
                 WHERE quote_id = $1 ORDER BY field_code",
            )
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
            price_details = sqlx::query_as::<_, QuotePriceDetail>(
                "SELECT id, quote_id, parameter_code, parameter_name, parameter_value,
                        source, sort_order
                 FROM quote_price_details WHERE quote_id = $1 ORDER BY sort_order, id",
            )
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(QuoteWithDetails {
            quote,
            form_data,
            price_details,
        })
    }

    /// Override the price manually. Fails validation when `price <= 0`.
    pub async fn set_manual_price(
        pool: &PgPool,
        id: &str,
        price: f64,
        reason: Option<&str>,
    ) -> StoreResult<Quote> {
        if !(price > 0.0) {
            return Err(
                CoreError::Validation("manual_price must be greater than zero".into()).into(),
            );
        }

        let query = format!(
            "UPDATE quotes SET
                manual_price = $2, manual_price_reason = $3,
                final_price = $2, price_status = 'manual', updated_at = now()
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let quote = sqlx::query_as::<_, Quote>(&query)
            .bind(id)
            .bind(price)
            .bind(reason)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| CoreError::not_found("Quote", id))?;
        Ok(quote)
    }

    /// Clear a manual override; `final_price` reverts to the calculation.
    pub async fn clear_manual_price(pool: &PgPool, id: &str) -> StoreResult<Quote> {
        let query = format!(
            "UPDATE quotes SET
                manual_price = NULL, manual_price_reason = NULL,
                final_price = calculated_price, price_status = 'current',
                updated_at = now()
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let quote = sqlx::query_as::<_, Quote>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| CoreError::not_found("Quote", id))?;
        Ok(quote)
    }

    /// Set the quote status. `approved` stamps `approved_at`/`approved_by`.
    /// Transition direction is caller policy and is not restricted here.
    pub async fn update_status(
        pool: &PgPool,
        id: &str,
        status: QuoteStatus,
        approved_by: Option<&str>,
    ) -> StoreResult<Quote> {
        let approving = status == QuoteStatus::Approved;
        let query = format!(
            "UPDATE quotes SET
                status = $2,
                approved_at = CASE WHEN $3 THEN now() ELSE approved_at END,
                approved_by = CASE WHEN $3 THEN $4 ELSE approved_by END,
                updated_at = now()
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let quote = sqlx::query_as::<_, Quote>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(approving)
            .bind(approved_by)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| CoreError::not_found("Quote", id))?;
        Ok(quote)
    }

    /// Aggregate counts and `final_price` sums per status, optionally
    /// restricted to a `created_at` range.
    pub async fn statistics(
        pool: &PgPool,
        params: &StatisticsParams,
    ) -> Result<QuoteStatistics, sqlx::Error> {
        let by_status = sqlx::query_as::<_, StatusBucket>(
            "SELECT status, COUNT(*) AS count, SUM(final_price) AS total_final_price
             FROM quotes
             WHERE ($1::timestamptz IS NULL OR created_at >= $1)
               AND ($2::timestamptz IS NULL OR created_at <= $2)
             GROUP BY status
             ORDER BY status",
        )
        .bind(params.from)
        .bind(params.to)
        .fetch_all(pool)
        .await?;

        let total_count = by_status.iter().map(|b| b.count).sum();
        let total_final_price = by_status
            .iter()
            .filter_map(|b| b.total_final_price)
            .sum();

        Ok(QuoteStatistics {
            by_status,
            total_count,
            total_final_price,
        })
    }

    /// Explicit admin hard-delete; form data and price details cascade.
    pub async fn delete(pool: &PgPool, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Quote", id).into());
        }
        Ok(())
    }
}

/// Resolve the template a quote's form data is validated against: the
/// explicit id when given (must exist), otherwise the active template.
/// Submitting form data with no resolvable template is a validation error.
async fn resolve_template(
    tx: &mut Transaction<'_, Postgres>,
    explicit: Option<DbId>,
    has_form_data: bool,
) -> StoreResult<Option<DbId>> {
    if let Some(id) = explicit {
        let exists: Option<(DbId,)> = sqlx::query_as("SELECT id FROM form_templates WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        if exists.is_none() {
            return Err(CoreError::not_found("FormTemplate", id).into());
        }
        return Ok(Some(id));
    }

    let active: Option<(DbId,)> =
        sqlx::query_as("SELECT id FROM form_templates WHERE is_active LIMIT 1")
            .fetch_optional(&mut **tx)
            .await?;
    match active {
        Some((id,)) => Ok(Some(id)),
        None if has_form_data => {
            Err(CoreError::Validation("no active form template to validate form data against".into()).into())
        }
        None => Ok(None),
    }
}

/// Resolve the pricing formula: the explicit id when given (must exist),
/// otherwise the active formula, otherwise none.
async fn resolve_formula(
    tx: &mut Transaction<'_, Postgres>,
    explicit: Option<DbId>,
) -> StoreResult<Option<PriceFormula>> {
    if let Some(id) = explicit {
        let query = format!("SELECT {FORMULA_COLUMNS} FROM price_formulas WHERE id = $1");
        let formula = sqlx::query_as::<_, PriceFormula>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| CoreError::not_found("PriceFormula", id))?;
        return Ok(Some(formula));
    }

    let query = format!("SELECT {FORMULA_COLUMNS} FROM price_formulas WHERE is_active LIMIT 1");
    let formula = sqlx::query_as::<_, PriceFormula>(&query)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(formula)
}

/// Insert form-data rows for keys the template actually defines; unknown
/// keys are silently dropped.
async fn store_form_data(
    tx: &mut Transaction<'_, Postgres>,
    quote_id: &str,
    template_id: DbId,
    submitted: &HashMap<String, String>,
) -> StoreResult<Vec<QuoteFormData>> {
    let known = FormTemplateRepo::field_codes(&mut *tx, template_id).await?;

    let mut rows = Vec::new();
    for (field_code, field_value) in submitted {
        if !known.iter().any(|code| code == field_code) {
            continue;
        }
        let row = sqlx::query_as::<_, QuoteFormData>(
            "INSERT INTO quote_form_data (quote_id, field_code, field_value)
             VALUES ($1, $2, $3)
             RETURNING id, quote_id, field_code, field_value",
        )
        .bind(quote_id)
        .bind(field_code)
        .bind(field_value)
        .fetch_one(&mut **tx)
        .await?;
        rows.push(row);
    }
    rows.sort_by(|a, b| a.field_code.cmp(&b.field_code));
    Ok(rows)
}

/// Persist the calculation's audit trail in parameter order.
async fn store_price_details(
    tx: &mut Transaction<'_, Postgres>,
    quote_id: &str,
    outcome: &CalculationOutcome,
) -> StoreResult<Vec<QuotePriceDetail>> {
    let mut rows = Vec::with_capacity(outcome.calculation_details.len());
    for (index, detail) in outcome.calculation_details.iter().enumerate() {
        let row = sqlx::query_as::<_, QuotePriceDetail>(
            "INSERT INTO quote_price_details
                (quote_id, parameter_code, parameter_name, parameter_value, source, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, quote_id, parameter_code, parameter_name, parameter_value,
                       source, sort_order",
        )
        .bind(quote_id)
        .bind(&detail.code)
        .bind(&detail.name)
        .bind(detail.value)
        .bind(detail.source.as_str())
        .bind(index as i32)
        .fetch_one(&mut **tx)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}
