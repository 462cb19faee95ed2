//! Boundary between loosely typed store documents and typed records.
//!
//! Documents are decoded and coerced exactly once here; everything past this
//! point works with [`PerformanceEntry`] and [`Investor`].

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::entry::{PerformanceEntry, Subject};
use crate::models::investor::Investor;

use super::traits::Document;

/// Read a numeric field. JSON numbers and numeric strings are accepted;
/// anything else, including non-finite values, becomes `None`.
pub fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn fields_of<'a>(doc: &'a Document) -> Result<&'a Map<String, Value>, CoreError> {
    doc.fields.as_object().ok_or_else(|| {
        CoreError::ValidationError(format!("Document {} is not a JSON object", doc.id))
    })
}

fn parse_id(doc: &Document) -> Result<Uuid, CoreError> {
    Uuid::parse_str(doc.id.trim()).map_err(|_| {
        CoreError::ValidationError(format!("Document id '{}' is not a UUID", doc.id))
    })
}

fn required_string(fields: &Map<String, Value>, key: &str, doc_id: &str) -> Result<String, CoreError> {
    match fields.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(CoreError::ValidationError(format!(
            "Document {doc_id} is missing '{key}'"
        ))),
    }
}

fn optional_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Accepts a plain `YYYY-MM-DD` date or an RFC 3339 timestamp.
fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Decode a `performance` document.
///
/// `year` and `month` are required (month 1–12). A missing or null
/// `investorId` marks a portfolio-level entry.
pub fn decode_entry(doc: &Document) -> Result<PerformanceEntry, CoreError> {
    let id = parse_id(doc)?;
    let fields = fields_of(doc)?;

    let year = coerce_number(fields.get("year"))
        .filter(|y| y.fract() == 0.0 && *y >= f64::from(i32::MIN) && *y <= f64::from(i32::MAX))
        .map(|y| y as i32)
        .ok_or_else(|| CoreError::ValidationError(format!("Document {} has no valid 'year'", doc.id)))?;

    let month = coerce_number(fields.get("month"))
        .filter(|m| m.fract() == 0.0 && (1.0..=12.0).contains(m))
        .map(|m| m as u32)
        .ok_or_else(|| {
            CoreError::ValidationError(format!("Document {} has no valid 'month' (1-12)", doc.id))
        })?;

    let subject = match fields.get("investorId") {
        None | Some(Value::Null) => Subject::Portfolio,
        Some(Value::String(s)) if s.is_empty() => Subject::Portfolio,
        Some(Value::String(s)) => Subject::Investor(Uuid::parse_str(s).map_err(|_| {
            CoreError::ValidationError(format!(
                "Document {} has an invalid investorId '{s}'",
                doc.id
            ))
        })?),
        Some(other) => {
            return Err(CoreError::ValidationError(format!(
                "Document {} has an invalid investorId {other}",
                doc.id
            )))
        }
    };

    Ok(PerformanceEntry {
        id,
        subject,
        year,
        month,
        growth_amount: coerce_number(fields.get("growthAmount")),
        growth_percentage: coerce_number(fields.get("growthPercentage")),
        deposit: coerce_number(fields.get("deposit")),
        withdrawal: coerce_number(fields.get("withdrawal")),
        notes: optional_string(fields, "notes"),
    })
}

/// Decode an `investors` document.
///
/// `name`, `email` and `username` are required. The join date is read from
/// `joined` or `createdAt`, defaulting to today. Investors without a
/// `passwordHash` are decoded without credentials.
pub fn decode_investor(doc: &Document) -> Result<Investor, CoreError> {
    let id = parse_id(doc)?;
    let fields = fields_of(doc)?;

    let joined = ["joined", "createdAt"]
        .iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_str))
        .find_map(parse_date)
        .unwrap_or_else(|| {
            log::debug!("Investor document {} has no join date; using today", doc.id);
            Utc::now().date_naive()
        });

    Ok(Investor {
        id,
        name: required_string(fields, "name", &doc.id)?,
        email: required_string(fields, "email", &doc.id)?,
        username: required_string(fields, "username", &doc.id)?,
        password_hash: optional_string(fields, "passwordHash").unwrap_or_default(),
        starting_balance: coerce_number(fields.get("startingBalance")).unwrap_or(0.0),
        joined,
    })
}

/// Encode an entry as a `performance` document. Missing figures are omitted.
pub fn encode_entry(entry: &PerformanceEntry) -> Document {
    let mut fields = Map::new();
    fields.insert("year".into(), json!(entry.year));
    fields.insert("month".into(), json!(entry.month));
    if let Subject::Investor(investor_id) = entry.subject {
        fields.insert("investorId".into(), json!(investor_id.to_string()));
    }
    let figures = [
        ("growthAmount", entry.growth_amount),
        ("growthPercentage", entry.growth_percentage),
        ("deposit", entry.deposit),
        ("withdrawal", entry.withdrawal),
    ];
    for (key, value) in figures {
        if let Some(v) = value {
            fields.insert(key.into(), json!(v));
        }
    }
    if let Some(notes) = &entry.notes {
        fields.insert("notes".into(), json!(notes));
    }

    Document {
        id: entry.id.to_string(),
        fields: Value::Object(fields),
    }
}

/// Encode an investor as an `investors` document.
pub fn encode_investor(investor: &Investor) -> Document {
    let mut fields = Map::new();
    fields.insert("name".into(), json!(investor.name));
    fields.insert("email".into(), json!(investor.email));
    fields.insert("username".into(), json!(investor.username));
    if investor.has_password() {
        fields.insert("passwordHash".into(), json!(investor.password_hash));
    }
    fields.insert("startingBalance".into(), json!(investor.starting_balance));
    fields.insert("joined".into(), json!(investor.joined.format("%Y-%m-%d").to_string()));

    Document {
        id: investor.id.to_string(),
        fields: Value::Object(fields),
    }
}
