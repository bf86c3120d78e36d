//! Parameter-resolution precedence for price calculation.
//!
//! A [`ParameterDefinition`] plus its candidate [`LookupRow`]s and the
//! submitted form answers resolve to a single numeric value with an audit
//! record of which branch produced it. The precedence order is:
//!
//! 1. `fixed` — the definition's constant value.
//! 2. `form_lookup` — the submitted answer for the referenced form field
//!    selects a lookup row whose validity window contains `now`. A missing
//!    lookup resolves to `0` by design (tolerant default, not an error).
//! 3. `calculated` — a numeric form answer keyed by the parameter code.
//! 4. Fallback — a numeric form answer keyed by the parameter code, else `0`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// How a parameter derives its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    Fixed,
    FormLookup,
    Calculated,
}

impl ParameterType {
    /// Database representation (TEXT + CHECK column).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::FormLookup => "form_lookup",
            Self::Calculated => "calculated",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fixed" => Some(Self::Fixed),
            "form_lookup" => Some(Self::FormLookup),
            "calculated" => Some(Self::Calculated),
            _ => None,
        }
    }
}

/// Which resolution branch produced a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterSource {
    Fixed,
    Lookup,
    Form,
}

impl ParameterSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Lookup => "lookup",
            Self::Form => "form",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fixed" => Some(Self::Fixed),
            "lookup" => Some(Self::Lookup),
            "form" => Some(Self::Form),
            _ => None,
        }
    }
}

/// A pricing input definition, detached from its storage row.
#[derive(Debug, Clone)]
pub struct ParameterDefinition {
    pub code: String,
    pub name: String,
    pub parameter_type: ParameterType,
    pub fixed_value: Option<f64>,
    pub form_field_code: Option<String>,
}

/// A candidate lookup row for a `form_lookup` parameter.
#[derive(Debug, Clone)]
pub struct LookupRow {
    pub form_field_code: String,
    pub option_value: String,
    pub price_value: f64,
    pub valid_from: Timestamp,
    pub valid_to: Option<Timestamp>,
    pub is_active: bool,
}

impl LookupRow {
    fn matches(&self, field_code: &str, submitted: &str, now: Timestamp) -> bool {
        self.is_active
            && self.form_field_code == field_code
            && self.option_value == submitted
            && self.valid_from <= now
            && self.valid_to.map_or(true, |until| now <= until)
    }
}

/// Audit record for one resolved parameter.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedParameter {
    pub code: String,
    pub name: String,
    pub value: f64,
    pub source: ParameterSource,
}

/// Suffixes stripped from a parameter code to derive its form field code
/// when the definition does not name one explicitly
/// (e.g. `material_cost` reads the `material` answer).
const FIELD_CODE_SUFFIXES: &[&str] = &["_cost", "_rate", "_price"];

/// The form field a `form_lookup` parameter reads its answer from.
pub fn lookup_field_code(definition: &ParameterDefinition) -> String {
    if let Some(explicit) = &definition.form_field_code {
        if !explicit.is_empty() {
            return explicit.clone();
        }
    }
    for suffix in FIELD_CODE_SUFFIXES {
        if let Some(stripped) = definition.code.strip_suffix(suffix) {
            if !stripped.is_empty() {
                return stripped.to_string();
            }
        }
    }
    definition.code.clone()
}

/// Resolve one parameter against the submitted form answers.
///
/// `lookups` only needs to contain rows belonging to this parameter; rows
/// are matched in the order given, so callers wanting deterministic
/// overlap behavior should sort newest-first ("last match wins").
pub fn resolve_parameter(
    definition: &ParameterDefinition,
    lookups: &[LookupRow],
    form_data: &HashMap<String, String>,
    now: Timestamp,
) -> ResolvedParameter {
    let (value, source) = match definition.parameter_type {
        ParameterType::Fixed => (
            definition.fixed_value.unwrap_or(0.0),
            ParameterSource::Fixed,
        ),
        ParameterType::FormLookup => {
            let field_code = lookup_field_code(definition);
            let submitted = form_data.get(&field_code).map(String::as_str).unwrap_or("");
            let value = lookups
                .iter()
                .find(|row| row.matches(&field_code, submitted, now))
                .map(|row| row.price_value)
                // No matching lookup resolves to 0, not an error.
                .unwrap_or(0.0);
            (value, ParameterSource::Lookup)
        }
        ParameterType::Calculated => numeric_form_value(definition, form_data),
    };

    ResolvedParameter {
        code: definition.code.clone(),
        name: definition.name.clone(),
        value,
        source,
    }
}

/// Numeric form answer keyed by the parameter code; `0` when absent or
/// non-numeric.
fn numeric_form_value(
    definition: &ParameterDefinition,
    form_data: &HashMap<String, String>,
) -> (f64, ParameterSource) {
    match form_data.get(&definition.code) {
        Some(raw) => (raw.trim().parse().unwrap_or(0.0), ParameterSource::Form),
        None => (0.0, ParameterSource::Form),
    }
}
