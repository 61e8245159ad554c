use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::{
    domain::{Catalog, FormField, FormValues, YearValue},
    error::ContractError,
};

pub const CATALOG_PATH: &str = "retrive-values";
pub const PREDICT_PATH: &str = "predict";

/// Body of `GET /retrive-values`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub name: Vec<String>,
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(default)]
    pub fuel_type: Vec<String>,
    #[serde(default)]
    pub year: Vec<YearValue>,
}

impl From<CatalogResponse> for Catalog {
    fn from(value: CatalogResponse) -> Self {
        Self {
            group_values: dedup_in_order(value.companies),
            item_values: dedup_in_order(value.name),
            fuel_type_values: dedup_in_order(value.fuel_type),
            year_values: dedup_in_order(value.year),
        }
    }
}

/// Drops values whose rendered text was already seen, so `2015` and
/// `"2015"` collapse into one option.
fn dedup_in_order<T: ToString>(values: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .into_iter()
        .filter(|value| seen.insert(value.to_string()))
        .collect()
}

/// Body of `POST /predict`. Field names are fixed by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub name: String,
    pub company: String,
    pub year: Number,
    pub kms_driven: Number,
    pub fuel_type: String,
}

impl PredictRequest {
    pub fn from_values(values: &FormValues) -> Result<Self, ContractError> {
        Ok(Self {
            name: required(values, FormField::Item)?,
            company: required(values, FormField::Group)?,
            year: numeric(values, FormField::Year)?,
            kms_driven: numeric(values, FormField::KmsDriven)?,
            fuel_type: required(values, FormField::FuelType)?,
        })
    }
}

fn required(values: &FormValues, field: FormField) -> Result<String, ContractError> {
    let value = values.get(field).trim();
    if value.is_empty() {
        return Err(ContractError::Missing { field });
    }
    Ok(value.to_string())
}

fn numeric(values: &FormValues, field: FormField) -> Result<Number, ContractError> {
    let raw = required(values, field)?;
    parse_number(&raw).ok_or(ContractError::NotANumber { field, value: raw })
}

/// Parses user text into a JSON number, keeping integers integral.
pub fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(int) = text.parse::<i64>() {
        return Some(Number::from(int));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Body of a `/predict` response. Success carries a numeric `prediction`,
/// failure an `error` text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl PredictResponse {
    pub fn success(prediction: f64) -> Self {
        Self {
            prediction: Number::from_f64(prediction).map(Value::Number),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            prediction: None,
            error: Some(Value::String(message.into())),
        }
    }

    pub fn prediction_value(&self) -> Option<f64> {
        match &self.prediction {
            Some(Value::Number(number)) => number.as_f64().filter(|value| value.is_finite()),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            None | Some(Value::Null) => None,
            Some(Value::String(message)) => Some(message.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}
