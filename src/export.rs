// src/export.rs

use chrono::{SecondsFormat, TimeZone, Utc};
use mongodb::bson::{Bson, Document};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer error: {0}")]
    Buffer(String),
}

/// Raw documents as delimited text. Columns are the union of the documents'
/// keys in first-seen order; values are written as stored.
pub fn documents_to_csv(documents: &[Document], delimiter: u8) -> Result<String, ExportError> {
    let mut columns: Vec<&str> = Vec::new();

    for document in documents {
        for key in document.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    if columns.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(&columns)?;

    for document in documents {
        let record = columns
            .iter()
            .map(|column| document.get(column).map(render_cell).unwrap_or_default());

        writer.write_record(record)?;
    }

    finish(writer)
}

fn render_cell(value: &Bson) -> String {
    match value {
        Bson::String(text) => text.clone(),
        Bson::Double(v) => v.to_string(),
        Bson::Int32(v) => v.to_string(),
        Bson::Int64(v) => v.to_string(),
        Bson::Boolean(v) => v.to_string(),
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::DateTime(dt) => Utc
            .timestamp_millis_opt(dt.timestamp_millis())
            .single()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            .unwrap_or_default(),
        Bson::Null | Bson::Undefined => String::new(),
        other => other.clone().into_relaxed_extjson().to_string(),
    }
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| ExportError::Buffer(e.to_string()))
}
