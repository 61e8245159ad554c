use std::fmt;

use serde::{Deserialize, Serialize};

/// Fields of the vehicle form, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    Item,
    Group,
    Year,
    KmsDriven,
    FuelType,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Item,
        FormField::Group,
        FormField::Year,
        FormField::KmsDriven,
        FormField::FuelType,
    ];

    /// Key used by the prediction service for this field.
    pub fn wire_name(self) -> &'static str {
        match self {
            FormField::Item => "name",
            FormField::Group => "company",
            FormField::Year => "year",
            FormField::KmsDriven => "kms_driven",
            FormField::FuelType => "fuel_type",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Item => "Car Name",
            FormField::Group => "Company",
            FormField::Year => "Year",
            FormField::KmsDriven => "Kms Driven",
            FormField::FuelType => "Fuel Type",
        }
    }

    /// Select-style fields only accept values offered by the catalog.
    pub fn is_select(self) -> bool {
        !matches!(self, FormField::KmsDriven)
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Raw, user-entered form values. Empty strings mean "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub item: String,
    pub group: String,
    pub year: String,
    pub kms_driven: String,
    pub fuel_type: String,
}

impl FormValues {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Item => &self.item,
            FormField::Group => &self.group,
            FormField::Year => &self.year,
            FormField::KmsDriven => &self.kms_driven,
            FormField::FuelType => &self.fuel_type,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Item => self.item = value,
            FormField::Group => self.group = value,
            FormField::Year => self.year = value,
            FormField::KmsDriven => self.kms_driven = value,
            FormField::FuelType => self.fuel_type = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        FormField::ALL.iter().all(|field| self.get(*field).is_empty())
    }
}

/// A year as served by the catalog endpoint: either a JSON integer or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearValue {
    Number(i64),
    Text(String),
}

impl fmt::Display for YearValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearValue::Number(year) => write!(f, "{year}"),
            YearValue::Text(year) => f.write_str(year),
        }
    }
}

/// Legal values per selectable field, populated once per mount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub group_values: Vec<String>,
    pub item_values: Vec<String>,
    pub fuel_type_values: Vec<String>,
    pub year_values: Vec<YearValue>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.group_values.is_empty()
            && self.item_values.is_empty()
            && self.fuel_type_values.is_empty()
            && self.year_values.is_empty()
    }

    /// Year options rendered as the text a select would submit.
    pub fn year_options(&self) -> Vec<String> {
        self.year_values.iter().map(ToString::to_string).collect()
    }
}
