//! Per-field validation rules for the vehicle form.

use std::collections::BTreeMap;

use shared::{
    domain::{FormField, FormValues},
    protocol::parse_number,
};

pub const REQUIRED: &str = "Required";
pub const NOT_A_NUMBER: &str = "Must be a number";
pub const NEGATIVE: &str = "Must be greater than or equal to 0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    Required,
    Numeric,
    NonNegative,
}

const RULES: [(FormField, &[Check]); 5] = [
    (FormField::Item, &[Check::Required]),
    (FormField::Group, &[Check::Required]),
    (FormField::Year, &[Check::Required, Check::Numeric]),
    (
        FormField::KmsDriven,
        &[Check::Required, Check::Numeric, Check::NonNegative],
    ),
    (FormField::FuelType, &[Check::Required]),
];

impl Check {
    fn run(self, raw: &str) -> Option<&'static str> {
        let value = raw.trim();
        match self {
            Check::Required => value.is_empty().then_some(REQUIRED),
            Check::Numeric => parse_number(value).is_none().then_some(NOT_A_NUMBER),
            Check::NonNegative => parse_number(value)
                .and_then(|number| number.as_f64())
                .filter(|number| *number < 0.0)
                .map(|_| NEGATIVE),
        }
    }
}

/// Field errors for one evaluation of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    errors: BTreeMap<FormField, String>,
}

impl ValidationState {
    pub fn error(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    /// Errors of the fields accepted by `keep`.
    pub fn retain_fields(&self, mut keep: impl FnMut(FormField) -> bool) -> Self {
        Self {
            errors: self
                .errors
                .iter()
                .filter(|(field, _)| keep(**field))
                .map(|(field, message)| (*field, message.clone()))
                .collect(),
        }
    }
}

/// Evaluates every field; the first failing check of a field is its error.
pub fn validate(values: &FormValues) -> ValidationState {
    let mut state = ValidationState::default();
    for (field, checks) in RULES {
        let raw = values.get(field);
        if let Some(message) = checks.iter().find_map(|check| check.run(raw)) {
            state.insert(field, message);
        }
    }
    state
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
