use crate::template::builder::parse_date_time;
use crate::template::fields::{FieldValidation, InputValue, RequiredField, UserInputValues, ValidationKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use tracing::warn;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Checks every field independently and collects all problems.
pub fn validate_fields(fields: &[RequiredField], values: &UserInputValues) -> ValidationReport {
    let mut errors = Vec::new();

    for field in fields {
        let Some(value) = values.supplied(field.id) else {
            if field.required {
                errors.push(format!("{} is required", field.label));
            }
            continue;
        };
        if let Some(validation) = field.validation.as_ref() {
            check_value(&field.label, validation, value, &mut errors);
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

fn check_value(label: &str, validation: &FieldValidation, value: &InputValue, errors: &mut Vec<String>) {
    let text = value.as_text();

    match validation.kind {
        ValidationKind::Url => {
            if Url::parse(text.trim()).is_err() {
                errors.push(format!("{label} must be a valid URL"));
            }
        }
        ValidationKind::Number => {
            let is_number = match value {
                InputValue::Number(n) => n.is_finite(),
                InputValue::Text(s) => s.trim().parse::<f64>().map(f64::is_finite).unwrap_or(false),
            };
            if !is_number {
                errors.push(format!("{label} must be a number"));
            }
        }
        ValidationKind::Date => {
            if parse_date_time(value).is_none() {
                errors.push(format!("{label} must be a valid date"));
            }
        }
        ValidationKind::Text
        | ValidationKind::Email
        | ValidationKind::Phone
        | ValidationKind::Currency => {}
    }

    let length = text.chars().count();
    if let Some(min) = validation.min_length {
        if length < min {
            errors.push(format!("{label} must have at least {min} characters"));
        }
    }
    if let Some(max) = validation.max_length {
        if length > max {
            errors.push(format!("{label} cannot be longer than {max} characters"));
        }
    }

    if let Some(pattern) = validation.pattern.as_deref() {
        if let Some(re) = compiled_pattern(pattern) {
            if !re.is_match(&text) {
                errors.push(format!("{label} has an invalid format"));
            }
        }
    }
}

/// Compiled form of `pattern`, built once per process. `None` for a pattern
/// that does not compile.
fn compiled_pattern(pattern: &str) -> Option<Regex> {
    static PATTERNS: OnceLock<Mutex<HashMap<String, Option<Regex>>>> = OnceLock::new();
    let mut cache = PATTERNS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    cache
        .entry(pattern.to_string())
        .or_insert_with(|| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(err) => {
                warn!(%pattern, "skipping invalid validation pattern: {err}");
                None
            }
        })
        .clone()
}
