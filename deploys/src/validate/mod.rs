//! Request validation

pub mod format;
pub mod rules;
pub mod validator;

pub use rules::ValidationRules;
pub use validator::{admit, Validatable, ValidationError, Validator};
