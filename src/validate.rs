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

//! # Input Validation
//!
//! Checks run before any transformation. Errors abort the export, warnings
//! are logged and the export proceeds.
//!
//! | Check | Severity |
//! |---|---|
//! | data null or absent | error |
//! | columns present but not a list | error |
//! | column without a resolvable key | error |
//! | serialization dry-run fails | error |
//! | empty data | warning |
//! | empty column list | warning |
//! | sheet at or above 90 % of the row/column ceiling | warning |

use serde::Serialize;
use serde_json::Value;

use crate::errors::{Result, ZiError};
use crate::record::ZiDataset;
use crate::schema::ZiColumnSpec;

/// Row ceiling of a single spreadsheet sheet.
pub const ZI_SHEET_MAX_ROWS: usize = 1_048_576;
/// Column ceiling of a single spreadsheet sheet.
pub const ZI_SHEET_MAX_COLUMNS: usize = 16_384;

const CEILING_WARN_RATIO: f64 = 0.9;

/// Outcome of a validation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ZiValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ZiValidationReport {
    fn new() -> Self {
        Self {
            is_valid: true,
            ..Default::default()
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(message.into());
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn merge(&mut self, other: ZiValidationReport) {
        self.is_valid &= other.is_valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Logs warnings and converts errors into a single validation error.
    pub fn into_result(self, context: &str) -> Result<Vec<String>> {
        for warning in &self.warnings {
            log::warn!("export.validation.warning: {} - context={}", warning, context);
        }
        if self.is_valid {
            Ok(self.warnings)
        } else {
            Err(ZiError::validation(format!("{}: {}", context, self.errors.join("; "))))
        }
    }
}

/// Validates raw JSON input and an optional raw column list.
pub fn validate(data: Option<&Value>, columns: Option<&Value>) -> ZiValidationReport {
    let mut report = ZiValidationReport::new();

    match data {
        None | Some(Value::Null) => report.error("data is null or undefined"),
        Some(Value::Array(items)) if items.is_empty() => report.warn("data is empty"),
        Some(value) => {
            if let Err(err) = serde_json::to_vec(value) {
                report.error(format!("data is not serializable: {}", err));
            }
        }
    }

    match columns {
        None | Some(Value::Null) => {}
        Some(Value::Array(list)) => {
            if list.is_empty() {
                report.warn("column list is empty");
            }
            for (index, column) in list.iter().enumerate() {
                check_raw_column(column, &index.to_string(), &mut report);
            }
        }
        Some(_) => report.error("columns must be a list"),
    }

    report
}

fn check_raw_column(column: &Value, position: &str, report: &mut ZiValidationReport) {
    match column {
        Value::String(name) if !name.is_empty() => {}
        Value::Object(obj) => {
            match obj.get("key").and_then(Value::as_str) {
                Some(key) if !key.is_empty() => {}
                _ => report.error(format!("column {} lacks a resolvable key", position)),
            }
            match obj.get("nested") {
                None | Some(Value::Null) => {}
                Some(Value::Array(nested)) => {
                    for (index, child) in nested.iter().enumerate() {
                        check_raw_column(child, &format!("{}.{}", position, index), report);
                    }
                }
                Some(_) => report.error(format!("column {} nested must be a list", position)),
            }
        }
        _ => report.error(format!("column {} lacks a resolvable key", position)),
    }
}

/// Validates a parsed dataset against its effective column list.
pub fn validate_dataset(dataset: &ZiDataset, columns: Option<&[ZiColumnSpec]>) -> ZiValidationReport {
    let mut report = ZiValidationReport::new();

    if dataset.data.is_empty() {
        report.warn(format!("dataset '{}' is empty", dataset.name));
    } else if let Err(err) = serde_json::to_vec(&dataset.data) {
        report.error(format!("dataset '{}' is not serializable: {}", dataset.name, err));
    }

    if let Some(columns) = dataset.columns.as_deref().or(columns) {
        if columns.is_empty() {
            report.warn(format!("dataset '{}' has an empty column list", dataset.name));
        }
        check_columns(columns, "", &mut report);
    }

    report
}

fn check_columns(columns: &[ZiColumnSpec], prefix: &str, report: &mut ZiValidationReport) {
    for (index, column) in columns.iter().enumerate() {
        let position = format!("{}{}", prefix, index);
        if column.key().is_empty() {
            report.error(format!("column {} lacks a resolvable key", position));
        }
        if let Some(nested) = column.nested() {
            check_columns(nested, &format!("{}.", position), report);
        }
    }
}

/// Dataset validation plus spreadsheet size ceilings.
///
/// Exceeding a ceiling is reported as a warning; the backend rejects the
/// write if the sheet really does not fit.
pub fn validate_tabular(
    dataset: &ZiDataset,
    columns: Option<&[ZiColumnSpec]>,
    include_headers: bool,
) -> ZiValidationReport {
    let mut report = validate_dataset(dataset, columns);

    let rows = dataset.data.len() + usize::from(include_headers);
    let cols = match dataset.columns.as_deref().or(columns) {
        Some(columns) if !columns.is_empty() => columns.len(),
        _ => dataset
            .data
            .first()
            .and_then(Value::as_object)
            .map_or(0, |record| record.len()),
    };

    let mut size = ZiValidationReport::new();
    check_ceiling(&dataset.name, "rows", rows, ZI_SHEET_MAX_ROWS, &mut size);
    check_ceiling(&dataset.name, "columns", cols, ZI_SHEET_MAX_COLUMNS, &mut size);
    report.merge(size);
    report
}

fn check_ceiling(name: &str, what: &str, count: usize, max: usize, report: &mut ZiValidationReport) {
    if count > max {
        report.warn(format!("dataset '{}' has {} {}, above the sheet limit of {}", name, count, what, max));
    } else if count as f64 >= max as f64 * CEILING_WARN_RATIO {
        report.warn(format!("dataset '{}' has {} {}, close to the sheet limit of {}", name, count, what, max));
    }
}
