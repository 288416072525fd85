//! Student health record model.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// A measured value with its unit, e.g. height in cm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Measurement {
    #[serde(default, deserialize_with = "blank_number_as_none")]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: String,
}

impl Measurement {
    pub fn empty(unit: &str) -> Self {
        Self {
            value: None,
            unit: unit.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChronicCondition {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "blank_date_as_none", skip_serializing_if = "Option::is_none")]
    pub diagnosed_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default, deserialize_with = "blank_date_as_none", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_date_as_none", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Immunization {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "blank_date_as_none", skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_date_as_none", skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Checkup {
    #[serde(default, deserialize_with = "blank_date_as_none", skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub doctor: String,
    #[serde(default)]
    pub notes: String,
}

/// A student's health record as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Id of the student this record belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<String>,
    #[serde(default)]
    pub blood_group: String,
    #[serde(default = "default_height")]
    pub height: Measurement,
    #[serde(default = "default_weight")]
    pub weight: Measurement,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub chronic_conditions: Vec<ChronicCondition>,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub immunizations: Vec<Immunization>,
    #[serde(default)]
    pub last_checkup: Checkup,
}

impl Default for HealthRecord {
    fn default() -> Self {
        Self {
            id: None,
            student: None,
            blood_group: String::new(),
            height: default_height(),
            weight: default_weight(),
            allergies: Vec::new(),
            chronic_conditions: Vec::new(),
            medications: Vec::new(),
            immunizations: Vec::new(),
            last_checkup: Checkup::default(),
        }
    }
}

fn default_height() -> Measurement {
    Measurement::empty("cm")
}

fn default_weight() -> Measurement {
    Measurement::empty("kg")
}

/// Form inputs send `""` for untouched fields; treat them like a missing value.
fn blank_number_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        // Numeric inputs arrive as strings ("172.5").
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got {:?}", s))),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a number, got {}",
            other
        ))),
    }
}

/// Dates come from the form as `YYYY-MM-DD` and from the backend as ISO timestamps.
fn blank_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_date(s.trim())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date {:?}", s))),
    }
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(input).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}
