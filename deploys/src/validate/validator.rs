//! Validator collecting every violation of a request

use std::fmt;

use deploys_protocol::ValidationItem;

use super::format::{valid_name, NAME_PATTERN};
use super::rules::ValidationRules;

/// All rule violations of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub items: Vec<ValidationItem>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            items: vec![ValidationItem {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn messages(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.message.as_str()).collect()
    }

    pub fn has_message(&self, message: &str) -> bool {
        self.items.iter().any(|i| i.message == message)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "api: validate error: {}", self.messages().join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Request that can check itself before it reaches the store
pub trait Validatable {
    /// Trim and canonicalize user input
    fn normalize(&mut self) {}

    fn validate(&self, v: &mut Validator);
}

/// Normalize and validate a request, returning it when admitted
pub fn admit<T: Validatable>(mut request: T, rules: &ValidationRules) -> Result<T, ValidationError> {
    request.normalize();
    let mut v = Validator::new(rules);
    request.validate(&mut v);
    v.finish()?;
    Ok(request)
}

pub struct Validator<'a> {
    rules: &'a ValidationRules,
    items: Vec<ValidationItem>,
}

impl<'a> Validator<'a> {
    pub fn new(rules: &'a ValidationRules) -> Self {
        Self {
            rules,
            items: Vec::new(),
        }
    }

    pub fn rules(&self) -> &ValidationRules {
        self.rules
    }

    /// Record `message` when `ok` is false; returns `ok`
    pub fn must(&mut self, ok: bool, field: &str, message: impl Into<String>) -> bool {
        if !ok {
            self.items.push(ValidationItem {
                field: field.to_string(),
                message: message.into(),
            });
        }
        ok
    }

    pub fn required(&mut self, field: &str, value: &str) -> bool {
        self.must(!value.is_empty(), field, format!("{} required", field))
    }

    /// Resource name, checked against the name pattern and length bounds
    pub fn name(&mut self, field: &str, value: &str) -> bool {
        let (min, max) = (self.rules.name_min_length, self.rules.name_max_length);
        let pattern_ok = self.must(
            valid_name(value),
            field,
            format!("{} invalid {}", field, NAME_PATTERN),
        );
        let count = value.chars().count();
        let length_ok = self.must(
            count >= min && count <= max,
            field,
            format!("{} must have length between {}-{} characters", field, min, max),
        );
        pattern_ok && length_ok
    }

    /// Project SID
    pub fn project(&mut self, value: &str) -> bool {
        if !self.required("project", value) {
            return false;
        }
        let (min, max) = (self.rules.project_min_length, self.rules.project_max_length);
        let count = value.chars().count();
        self.must(valid_name(value), "project", format!("project invalid {}", NAME_PATTERN))
            && self.must(
                count >= min && count <= max,
                "project",
                format!("project must have length between {}-{} characters", min, max),
            )
    }

    pub fn is_valid(&self) -> bool {
        self.items.is_empty()
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.items.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { items: self.items })
        }
    }
}
