pub mod form_templates;
pub mod price_formulas;
pub mod price_parameters;
pub mod price_settings;
pub mod quotes;
