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

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config;
use crate::errors::Result;
use crate::project::path;
use crate::schema::ZiColumnSpec;

/// Flags governing how a record is projected onto a column schema.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiProjectionOptions {
    /// Copy every source field and overlay the projected columns.
    pub include_all_fields: bool,
    /// Skip columns whose value is null after default substitution.
    pub exclude_null: bool,
    /// Skip columns whose path resolves to nothing after default substitution.
    pub exclude_undefined: bool,
    /// Splice nested object projections in as `output_key.<key>` entries.
    pub flatten_objects: bool,
}

impl ZiProjectionOptions {
    pub fn from_json(config: &Value) -> Result<Self> {
        let obj = config::as_object(config, "projection")?;
        Ok(Self {
            include_all_fields: config::bool_or(obj, "include_all_fields", false, "projection")?,
            exclude_null: config::bool_or(obj, "exclude_null", false, "projection")?,
            exclude_undefined: config::bool_or(obj, "exclude_undefined", false, "projection")?,
            flatten_objects: config::bool_or(obj, "flatten_objects", false, "projection")?,
        })
    }
}

/// Projects one record onto `columns`.
///
/// Total over any input: a non-object row yields `{}`. The row is only read.
pub fn project(row: &Value, columns: &[ZiColumnSpec], options: &ZiProjectionOptions) -> Value {
    if !row.is_object() {
        return Value::Object(Map::new());
    }

    let mut output = if options.include_all_fields {
        row.clone()
    } else {
        Value::Object(Map::new())
    };

    for column in columns {
        project_column(row, column, options, &mut output);
    }
    output
}

fn project_column(
    row: &Value,
    column: &ZiColumnSpec,
    options: &ZiProjectionOptions,
    output: &mut Value,
) {
    let output_key = column.output_key();
    let value = column.source_value(row);

    match value {
        None if options.exclude_undefined => return,
        Some(Value::Null) if options.exclude_null => return,
        _ => {}
    }

    let value = column.format_value(value, row);
    let Some(mut value) = value else {
        return;
    };

    if let Some(nested) = column.nested() {
        match &value {
            Value::Array(items) => {
                value = Value::Array(items.iter().map(|item| project(item, nested, options)).collect());
            }
            Value::Object(_) => {
                let projected = project(&value, nested, options);
                if options.flatten_objects {
                    if let (Value::Object(fields), Some(target)) = (projected, output.as_object_mut()) {
                        for (key, nested_value) in fields {
                            target.insert(format!("{}.{}", output_key, key), nested_value);
                        }
                    }
                    return;
                }
                value = projected;
            }
            _ => {}
        }
    }

    path::set(output, output_key, value);
}

/// Projects every record of a batch.
pub fn project_all(
    rows: &[Value],
    columns: &[ZiColumnSpec],
    options: &ZiProjectionOptions,
) -> Vec<Value> {
    rows.iter().map(|row| project(row, columns, options)).collect()
}
