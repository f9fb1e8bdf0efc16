//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd project team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! Conversion of records into a grid of typed cells.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::config;
use crate::errors::Result;
use crate::schema::ZiColumnSpec;

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// One spreadsheet cell.
#[derive(Clone, Debug, PartialEq)]
pub enum ZiCell {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Rendered by the backend with the sheet's date format.
    DateTime(NaiveDateTime),
}

impl ZiCell {
    pub fn text(value: impl Into<String>) -> Self {
        ZiCell::Text(value.into())
    }

    /// Plain-text rendering, used for CSV output and column widths.
    pub fn display_text(&self) -> String {
        match self {
            ZiCell::Empty => String::new(),
            ZiCell::Bool(b) => b.to_string(),
            ZiCell::Number(n) => n.to_string(),
            ZiCell::Text(s) => s.clone(),
            ZiCell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ZiCell::Empty)
    }
}

/// Row conversion settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ZiRowOptions {
    pub include_headers: bool,
    /// Text written for null values; empty means an empty cell.
    pub null_value: String,
    /// Text written for absent values; empty means an empty cell.
    pub undefined_value: String,
    /// Spreadsheet number format applied to date cells.
    pub date_format: String,
    /// Spreadsheet number format applied to numeric cells.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
    /// Turn ISO-8601 strings into date cells.
    pub parse_dates: bool,
}

impl Default for ZiRowOptions {
    fn default() -> Self {
        Self {
            include_headers: true,
            null_value: String::new(),
            undefined_value: String::new(),
            date_format: "yyyy-mm-dd hh:mm:ss".to_string(),
            number_format: None,
            parse_dates: false,
        }
    }
}

impl ZiRowOptions {
    pub fn from_json(config: &Value) -> Result<Self> {
        let obj = config::as_object(config, "rows")?;
        let defaults = Self::default();
        Ok(Self {
            include_headers: config::bool_or(obj, "include_headers", true, "rows")?,
            null_value: config::string_or(obj, "null_value", "", "rows")?,
            undefined_value: config::string_or(obj, "undefined_value", "", "rows")?,
            date_format: config::string_or(obj, "date_format", &defaults.date_format, "rows")?,
            number_format: config::string_opt(obj, "number_format", "rows")?,
            parse_dates: config::bool_or(obj, "parse_dates", false, "rows")?,
        })
    }
}

/// Converts records to rows, with a header row first when requested.
///
/// With a schema, each column is read by path with its default and
/// formatter applied. Without one, the header comes from the first record's
/// keys and each row holds the record's own values in natural order.
pub fn to_rows(records: &[&Value], columns: &[ZiColumnSpec], options: &ZiRowOptions) -> Vec<Vec<ZiCell>> {
    let mut rows = Vec::with_capacity(records.len() + 1);

    if columns.is_empty() {
        if options.include_headers {
            if let Some(first) = records.first().and_then(|record| record.as_object()) {
                rows.push(first.keys().map(|key| ZiCell::text(key.as_str())).collect());
            }
        }
        for &record in records {
            let row = match record {
                Value::Object(fields) => fields.values().map(|v| to_cell(Some(v), options)).collect(),
                other => vec![to_cell(Some(other), options)],
            };
            rows.push(row);
        }
        return rows;
    }

    if options.include_headers {
        rows.push(columns.iter().map(|c| ZiCell::text(c.header_label())).collect());
    }
    for record in records {
        rows.push(columns.iter().map(|column| column_cell(record, column, options)).collect());
    }
    rows
}

fn column_cell(record: &Value, column: &ZiColumnSpec, options: &ZiRowOptions) -> ZiCell {
    let value = column.format_value(column.source_value(record), record);
    to_cell(value.as_ref(), options)
}

/// Converts one value to a cell. `None` is an absent value.
pub fn to_cell(value: Option<&Value>, options: &ZiRowOptions) -> ZiCell {
    match value {
        None => placeholder(&options.undefined_value),
        Some(Value::Null) => placeholder(&options.null_value),
        Some(Value::Bool(b)) => ZiCell::Bool(*b),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(x) if x.is_finite() => ZiCell::Number(x),
            _ => ZiCell::Empty,
        },
        Some(Value::String(s)) => {
            if options.parse_dates {
                if let Some(dt) = parse_datetime(s) {
                    return ZiCell::DateTime(dt);
                }
            }
            ZiCell::Text(s.clone())
        }
        Some(structured) => ZiCell::Text(
            serde_json::to_string(structured).unwrap_or_else(|_| "[unrepresentable]".to_string()),
        ),
    }
}

fn placeholder(text: &str) -> ZiCell {
    if text.is_empty() {
        ZiCell::Empty
    } else {
        ZiCell::Text(text.to_string())
    }
}

/// Parses RFC 3339 timestamps, naive date-times and plain dates.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
