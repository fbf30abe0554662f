// src/sale.rs

use std::collections::BTreeMap;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use mongodb::bson::{self, oid::ObjectId, serde_helpers::serialize_object_id_as_hex_string, Bson, Document};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SaleError {
    #[error("Invalid objectid: {0}")]
    InvalidId(String),
    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Sale {
    #[serde(
        rename = "_id",
        default = "ObjectId::new",
        deserialize_with = "de_object_id",
        serialize_with = "serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    // period and classification
    #[serde(deserialize_with = "de_string")]
    pub key: String,
    #[serde(deserialize_with = "de_string")]
    pub distribution: String,
    #[serde(deserialize_with = "de_string")]
    pub rep: String,
    #[serde(deserialize_with = "de_string")]
    pub item: String,
    #[serde(deserialize_with = "de_number")]
    pub sale: f64,
    #[serde(deserialize_with = "de_integer")]
    pub quantity: i64,
    #[serde(deserialize_with = "de_string")]
    pub uom: String,
    #[serde(deserialize_with = "de_date")]
    pub date: DateTime<Utc>,
    // ship to
    #[serde(deserialize_with = "de_string")]
    pub customer: String,
    #[serde(deserialize_with = "de_string")]
    pub ship_to_name: String,
    #[serde(deserialize_with = "de_string")]
    pub addr1: String,
    #[serde(default, deserialize_with = "de_optional_string")]
    pub addr2: Option<String>,
    #[serde(deserialize_with = "de_string")]
    pub city: String,
    #[serde(deserialize_with = "de_string")]
    pub state: String,
    #[serde(deserialize_with = "de_string")]
    pub postal: String,
    #[serde(default, deserialize_with = "de_optional_string")]
    pub country: Option<String>,
    //
    #[serde(default, deserialize_with = "de_optional_string")]
    pub contract: Option<String>,
    #[serde(default, deserialize_with = "de_optional_string")]
    pub cust_nbr: Option<String>,
    #[serde(default, deserialize_with = "de_optional_notes")]
    pub notes: Option<BTreeMap<String, String>>,
    #[serde(default, deserialize_with = "de_optional_string")]
    pub gpo: Option<String>,
    #[serde(default, deserialize_with = "de_optional_number")]
    pub rebate: Option<f64>,
    #[serde(default, deserialize_with = "de_optional_number")]
    pub net: Option<f64>,
}

impl Sale {
    pub fn from_document(document: Document) -> bson::de::Result<Self> {
        bson::from_document(document)
    }
}

/// Sets `net` on a stored document: `sale` when `rebate` is missing, null or
/// zero, otherwise `rebate`. Values are copied as stored.
pub fn derive_net(document: &mut Document) {
    let sale = document.get("sale").cloned().unwrap_or(Bson::Null);

    let net = match document.get("rebate") {
        None | Some(Bson::Null) | Some(Bson::Undefined) => sale,
        Some(rebate) if number(rebate) == Some(0.0) => sale,
        Some(rebate) => rebate.clone(),
    };

    document.insert("net", net);
}

pub fn parse_sale_id(value: &str) -> Result<ObjectId, SaleError> {
    ObjectId::parse_str(value.trim()).map_err(|_| SaleError::InvalidId(value.to_string()))
}

fn invalid<E: serde::de::Error>(field: &'static str, value: &Bson) -> E {
    E::custom(SaleError::InvalidField { field, value: value.to_string() })
}

fn number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::String(v) => v.trim().parse().ok(),
        _ => None,
    }
}

fn text(value: &Bson) -> Option<String> {
    match value {
        Bson::String(v) => Some(v.clone()),
        Bson::Int32(v) => Some(v.to_string()),
        Bson::Int64(v) => Some(v.to_string()),
        // debug formatting keeps the `.0` on whole floats
        Bson::Double(v) => Some(format!("{:?}", v)),
        _ => None,
    }
}

fn de_object_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ObjectId, D::Error> {
    match Bson::deserialize(deserializer)? {
        Bson::ObjectId(oid) => Ok(oid),
        Bson::String(hex) => parse_sale_id(&hex).map_err(D::Error::custom),
        other => Err(invalid("_id", &other)),
    }
}

fn de_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Bson::deserialize(deserializer)?;
    text(&value).ok_or_else(|| invalid("string", &value))
}

fn de_optional_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Bson::deserialize(deserializer)? {
        Bson::Null | Bson::Undefined => Ok(None),
        value => text(&value).map(Some).ok_or_else(|| invalid("string", &value)),
    }
}

fn de_optional_notes<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, String>>, D::Error> {
    match Bson::deserialize(deserializer)? {
        Bson::Null | Bson::Undefined => Ok(None),
        Bson::Document(notes) => notes
            .iter()
            .map(|(name, value)| {
                text(value)
                    .map(|value| (name.clone(), value))
                    .ok_or_else(|| invalid("notes", value))
            })
            .collect::<Result<_, _>>()
            .map(Some),
        other => Err(invalid("notes", &other)),
    }
}

fn de_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Bson::deserialize(deserializer)?;
    number(&value).ok_or_else(|| invalid("number", &value))
}

fn de_optional_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Bson::deserialize(deserializer)? {
        Bson::Null | Bson::Undefined => Ok(None),
        value => number(&value).map(Some).ok_or_else(|| invalid("number", &value)),
    }
}

// whole numbers; floats are truncated toward zero
fn de_integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Bson::deserialize(deserializer)?;
    match value {
        Bson::Int32(v) => Ok(i64::from(v)),
        Bson::Int64(v) => Ok(v),
        Bson::Double(v) if v.is_finite() => Ok(v.trunc() as i64),
        Bson::String(ref v) => v.trim().parse().map_err(|_| invalid("integer", &value)),
        _ => Err(invalid("integer", &value)),
    }
}

fn de_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let value = Bson::deserialize(deserializer)?;
    let parsed = match &value {
        Bson::DateTime(dt) => Utc.timestamp_millis_opt(dt.timestamp_millis()).single(),
        Bson::String(text) => parse_date(text),
        _ => None,
    };

    parsed.ok_or_else(|| invalid("date", &value))
}

// accepts RFC 3339, MM/DD/YYYY and YYYY-MM-DD
fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%m/%d/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
