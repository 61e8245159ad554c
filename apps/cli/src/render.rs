//! Text rendering of controller state for the terminal.

use client_core::{FormController, InteractionError, SubmissionState, ValidationState};
use shared::domain::FormField;

pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 && price.abs() < 1e15 {
        format!("{price:.0}")
    } else {
        format!("{price:.2}")
    }
}

pub fn render_outcome(state: &SubmissionState) -> Option<String> {
    match state {
        SubmissionState::Idle => None,
        SubmissionState::Pending => Some("Predicting...".to_string()),
        SubmissionState::Succeeded { price, .. } => {
            Some(format!("Predicted Price: ₹ {}", format_price(*price)))
        }
        SubmissionState::Failed(failure) => Some(format!("Error: {}", failure.message)),
    }
}

pub fn render_errors(validation: &ValidationState) -> Vec<String> {
    validation
        .iter()
        .map(|(field, message)| format!("{}: {message}", field.label()))
        .collect()
}

pub fn render_rejection(err: &InteractionError, options: &[String]) -> String {
    match err {
        InteractionError::NotAnOption { field, value } if options.is_empty() => {
            format!("{} {value:?} is not available; no options are offered", field.label())
        }
        InteractionError::NotAnOption { field, value } => format!(
            "{} {value:?} is not available; choose one of: {}",
            field.label(),
            options.join(", ")
        ),
        other => other.to_string(),
    }
}

pub fn render_options(controller: &FormController, fields: &[FormField]) -> String {
    let mut out = String::new();
    for field in fields {
        out.push_str(field.label());
        out.push_str(":\n");
        for option in controller.options(*field) {
            out.push_str("  ");
            out.push_str(&option);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
