//! Price-calculation orchestration.
//!
//! Loads a formula's parameter definitions and lookup rows, resolves each
//! parameter against the submitted form answers, and evaluates the formula
//! expression. Runs on a `&mut PgConnection` so quote creation and update
//! can execute it inside their own transaction.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::Serialize;
use sqlx::PgConnection;
use teklif_core::error::CoreError;
use teklif_core::formula;
use teklif_core::pricing::{resolve_parameter, LookupRow, ResolvedParameter};
use teklif_core::types::DbId;

use crate::error::StoreResult;
use crate::models::price_formula::PriceFormula;
use crate::models::price_parameter::PriceParameterLookup;
use crate::repositories::price_formula_repo::PriceFormulaRepo;

/// The result of one price calculation: the total, the substituted
/// expression, the resolved value map, and the per-parameter audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationOutcome {
    pub total_price: f64,
    pub evaluated_formula: String,
    /// Resolved parameter values by code (BTreeMap for stable JSON order).
    pub parameter_values: BTreeMap<String, f64>,
    pub calculation_details: Vec<ResolvedParameter>,
}

/// Resolve every parameter linked to `formula` and evaluate its expression
/// against the submitted `form_data`.
///
/// The variable map holds parameter values first; raw form answers that
/// parse as numbers fill in identifiers not claimed by a parameter code.
pub async fn calculate(
    conn: &mut PgConnection,
    formula: &PriceFormula,
    form_data: &HashMap<String, String>,
) -> StoreResult<CalculationOutcome> {
    let parameters = PriceFormulaRepo::parameters_on(conn, formula.id).await?;

    let parameter_ids: Vec<DbId> = parameters.iter().map(|p| p.id).collect();
    let lookups = load_lookups(conn, &parameter_ids).await?;

    let now = Utc::now();
    let mut details = Vec::with_capacity(parameters.len());
    for parameter in &parameters {
        let definition = parameter.to_definition().ok_or_else(|| {
            CoreError::Internal(format!(
                "parameter '{}' has unknown type '{}'",
                parameter.code, parameter.parameter_type
            ))
        })?;
        let own_lookups: Vec<LookupRow> = lookups
            .iter()
            .filter(|row| row.price_parameter_id == parameter.id)
            .map(to_lookup_row)
            .collect();
        details.push(resolve_parameter(&definition, &own_lookups, form_data, now));
    }

    let mut variables: HashMap<String, f64> = details
        .iter()
        .map(|d| (d.code.clone(), d.value))
        .collect();
    // Raw form answers may appear in the expression directly (e.g. `qty`);
    // parameter codes shadow them.
    for (key, raw) in form_data {
        if !variables.contains_key(key) {
            if let Ok(value) = raw.trim().parse::<f64>() {
                variables.insert(key.clone(), value);
            }
        }
    }

    let evaluation = formula::evaluate(&formula.formula_expression, &variables)
        .map_err(CoreError::Formula)?;

    let parameter_values = details
        .iter()
        .map(|d| (d.code.clone(), d.value))
        .collect();

    Ok(CalculationOutcome {
        total_price: evaluation.value,
        evaluated_formula: evaluation.substituted,
        parameter_values,
        calculation_details: details,
    })
}

/// All lookup rows for the given parameters, ordered newest-first so that
/// overlapping validity windows resolve deterministically (last match wins).
async fn load_lookups(
    conn: &mut PgConnection,
    parameter_ids: &[DbId],
) -> Result<Vec<PriceParameterLookup>, sqlx::Error> {
    if parameter_ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, PriceParameterLookup>(
        "SELECT id, price_parameter_id, form_field_code, option_value, price_value,
                currency, valid_from, valid_to, is_active, created_at
         FROM price_parameter_lookups
         WHERE price_parameter_id = ANY($1)
         ORDER BY valid_from DESC, id DESC",
    )
    .bind(parameter_ids)
    .fetch_all(conn)
    .await
}

fn to_lookup_row(row: &PriceParameterLookup) -> LookupRow {
    LookupRow {
        form_field_code: row.form_field_code.clone(),
        option_value: row.option_value.clone(),
        price_value: row.price_value,
        valid_from: row.valid_from,
        valid_to: row.valid_to,
        is_active: row.is_active,
    }
}
