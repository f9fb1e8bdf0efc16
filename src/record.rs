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

//! # Zi Record Module
//!
//! This module provides the input shapes accepted by the export engine.
//! Records are plain JSON values; a dataset pairs a batch of records with
//! its own column schema and processing options.
//!
//! ## Design Principles
//!
//! - **Flexibility**: Records use JSON (serde_json::Value) so heterogeneous
//!   collections can be exported without a fixed schema
//! - **Borrowed input**: The engine only reads datasets; every export call
//!   builds its own working copies
//! - **Natural order**: Object keys keep insertion order, which is the column
//!   order of schema-less tabular exports
//!
//! ## Usage Example
//!
//! ```rust
//! use zi_export::record::{ZiDataset, ZiExportInput};
//! use zi_export::schema::{ZiColumnSpec, ZiFormatterRegistry};
//! use serde_json::json;
//!
//! // A bare array is a single dataset
//! let registry = ZiFormatterRegistry::with_builtins();
//! let input = ZiExportInput::from_json(&json!([{"id": 1}, {"id": 2}]), &registry)?;
//!
//! // Several named datasets, each with its own schema
//! let input = ZiExportInput::Multiple(vec![
//!     ZiDataset::new("Orders", vec![json!({"id": 1})])
//!         .with_columns(vec![ZiColumnSpec::field("id")]),
//!     ZiDataset::new("Refunds", vec![]),
//! ]);
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config;
use crate::errors::{Result, ZiError};
use crate::process::ZiProcessingOptions;
use crate::schema::{ZiColumnSpec, ZiFormatterRegistry};

/// Generic metadata map merged into envelopes and artifacts.
pub type ZiMetadata = Map<String, Value>;

/// Convenience alias for working on batches of records.
pub type ZiRecordBatch = Vec<Value>;

const PROCESSING_KEYS: [&str; 4] = ["filter", "sort", "limit", "offset"];

/// Named collection of records with its own schema and processing options.
///
/// # Fields
///
/// - `columns`: when `None`, the export-level column list applies
/// - `options`: when `None`, the export-level processing options apply
#[derive(Clone, Debug, Serialize)]
pub struct ZiDataset {
    pub name: String,
    #[serde(skip)]
    pub data: ZiRecordBatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ZiColumnSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ZiProcessingOptions>,
}

impl ZiDataset {
    pub fn new(name: impl Into<String>, data: ZiRecordBatch) -> Self {
        Self {
            name: name.into(),
            data,
            columns: None,
            options: None,
        }
    }

    /// Builds a dataset from typed records.
    ///
    /// Records that cannot be represented as JSON (for example maps with
    /// non-string keys) are rejected with a validation error.
    pub fn from_serialize<T: Serialize>(name: impl Into<String>, records: &[T]) -> Result<Self> {
        let name = name.into();
        let data = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                serde_json::to_value(record).map_err(|err| {
                    ZiError::validation(format!(
                        "dataset '{}' record {} is not serializable: {}",
                        name, index, err
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(name, data))
    }

    pub fn with_columns(mut self, columns: Vec<ZiColumnSpec>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn with_options(mut self, options: ZiProcessingOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Own column list if declared, else `fallback`.
    pub fn columns_or<'a>(&'a self, fallback: &'a [ZiColumnSpec]) -> &'a [ZiColumnSpec] {
        self.columns.as_deref().unwrap_or(fallback)
    }

    /// Parses `{name?, data, columns?, options? | filter/sort/limit/offset}`.
    pub fn from_json(config: &Value, default_name: &str, registry: &ZiFormatterRegistry) -> Result<Self> {
        let obj = config::as_object(config, "dataset")?;
        let name = config::string_or(obj, "name", default_name, "dataset")?;

        let data = match obj.get("data") {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Null) | None => {
                return Err(ZiError::validation(format!("dataset '{}' data is null or missing", name)))
            }
            Some(_) => return Err(ZiError::validation(format!("dataset '{}' data must be an array", name))),
        };

        let columns = config::present(obj, "columns")
            .map(|columns| ZiColumnSpec::list_from_json(columns, registry))
            .transpose()?;

        let options = match config::present(obj, "options") {
            Some(options) => Some(ZiProcessingOptions::from_json(options)?),
            None if PROCESSING_KEYS.iter().any(|key| obj.contains_key(*key)) => {
                Some(ZiProcessingOptions::from_json(config)?)
            }
            None => None,
        };

        Ok(Self {
            name,
            data,
            columns,
            options,
        })
    }
}

/// Shape of an export request.
#[derive(Clone, Debug)]
pub enum ZiExportInput {
    Single(ZiDataset),
    Multiple(Vec<ZiDataset>),
}

impl ZiExportInput {
    pub fn records(data: ZiRecordBatch) -> Self {
        ZiExportInput::Single(ZiDataset::new("Sheet1", data))
    }

    pub fn datasets(&self) -> &[ZiDataset] {
        match self {
            ZiExportInput::Single(dataset) => std::slice::from_ref(dataset),
            ZiExportInput::Multiple(datasets) => datasets,
        }
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, ZiExportInput::Multiple(_))
    }

    /// Total number of source records across all datasets.
    pub fn record_count(&self) -> usize {
        self.datasets().iter().map(|dataset| dataset.data.len()).sum()
    }

    /// Parses any accepted request shape.
    ///
    /// - a bare array: one dataset
    /// - `{datasets: [...]}`: one dataset per entry, unnamed entries become
    ///   `Dataset N`
    /// - `{data, columns?, ...}`: one dataset
    /// - any other object: a single record
    pub fn from_json(config: &Value, registry: &ZiFormatterRegistry) -> Result<Self> {
        match config {
            Value::Null => Err(ZiError::validation("export input is null")),
            Value::Array(items) => Ok(Self::records(items.clone())),
            Value::Object(obj) if obj.contains_key("datasets") => {
                let datasets = obj
                    .get("datasets")
                    .and_then(Value::as_array)
                    .ok_or_else(|| ZiError::validation("'datasets' must be an array"))?;
                datasets
                    .iter()
                    .enumerate()
                    .map(|(index, dataset)| {
                        ZiDataset::from_json(dataset, &format!("Dataset {}", index + 1), registry)
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(ZiExportInput::Multiple)
            }
            Value::Object(obj) if obj.contains_key("data") => {
                ZiDataset::from_json(config, "Sheet1", registry).map(ZiExportInput::Single)
            }
            Value::Object(_) => Ok(Self::records(vec![config.clone()])),
            other => Err(ZiError::validation(format!(
                "export input must be an array or object, got {}",
                other
            ))),
        }
    }
}

impl From<ZiDataset> for ZiExportInput {
    fn from(dataset: ZiDataset) -> Self {
        ZiExportInput::Single(dataset)
    }
}

impl From<Vec<ZiDataset>> for ZiExportInput {
    fn from(datasets: Vec<ZiDataset>) -> Self {
        ZiExportInput::Multiple(datasets)
    }
}
