//! Form schema models: versioned templates, their fields, and field options.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use teklif_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A form template row. At most one template is active system-wide;
/// version numbering is scoped per `code`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FormTemplate {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub version: i32,
    pub is_active: bool,
    pub supersedes_id: Option<DbId>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A field belonging to one template. `field_code` is unique per template.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FormField {
    pub id: DbId,
    pub form_template_id: DbId,
    pub field_code: String,
    pub field_name: String,
    pub field_type: String,
    pub sort_order: i32,
    pub is_required: bool,
    pub validation_rule: Option<String>,
    pub default_value: Option<String>,
    pub created_at: Timestamp,
}

/// A selectable option belonging to one field.
///
/// `price_value` here is display metadata; price resolution reads
/// `price_parameter_lookups` (see DESIGN.md).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FormFieldOption {
    pub id: DbId,
    pub form_field_id: DbId,
    pub option_value: String,
    pub option_label: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub price_value: Option<f64>,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create / update DTOs
// ---------------------------------------------------------------------------

/// Input for creating a new form template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFormTemplate {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub version: Option<i32>,
    pub is_active: Option<bool>,
    pub created_by: Option<String>,
}

/// Input for `create_new_version`: the copy keeps the source's code and
/// fields, these override its display metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTemplateVersion {
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_by: Option<String>,
}

/// Input for creating a field, optionally with inline options.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFormField {
    pub field_code: String,
    pub field_name: String,
    pub field_type: String,
    pub sort_order: Option<i32>,
    pub is_required: Option<bool>,
    pub validation_rule: Option<String>,
    pub default_value: Option<String>,
    #[serde(default)]
    pub options: Vec<CreateFieldOption>,
}

/// Inline option input for [`CreateFormField`].
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFieldOption {
    pub option_value: String,
    pub option_label: String,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
    pub price_value: Option<f64>,
}

/// Patch input for an existing field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFormField {
    pub field_name: Option<String>,
    pub field_type: Option<String>,
    pub sort_order: Option<i32>,
    pub is_required: Option<bool>,
    pub validation_rule: Option<String>,
    pub default_value: Option<String>,
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// A field with its ordered, active options.
#[derive(Debug, Clone, Serialize)]
pub struct FieldWithOptions {
    #[serde(flatten)]
    pub field: FormField,
    pub options: Vec<FormFieldOption>,
}

/// A template with its ordered fields and their options.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateWithFields {
    #[serde(flatten)]
    pub template: FormTemplate,
    pub fields: Vec<FieldWithOptions>,
}
