//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-row writes (version
//! creation, activation, quote creation/update) run inside one transaction.

pub mod form_field_repo;
pub mod form_template_repo;
pub mod price_formula_repo;
pub mod price_parameter_repo;
pub mod price_setting_repo;
pub mod quote_repo;

pub use form_field_repo::FormFieldRepo;
pub use form_template_repo::FormTemplateRepo;
pub use price_formula_repo::PriceFormulaRepo;
pub use price_parameter_repo::PriceParameterRepo;
pub use price_setting_repo::PriceSettingRepo;
pub use quote_repo::QuoteRepo;
