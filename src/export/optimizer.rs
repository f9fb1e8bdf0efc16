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
use serde_json::{Map, Number, Value};

use crate::config;
use crate::errors::{Result, ZiError};

const MAX_PRECISION: u32 = 15;

/// Flags for the size optimizer. Everything is off by default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiOptimizeOptions {
    pub remove_null: bool,
    /// Accepted for configuration parity; JSON values carry no absent marker.
    pub remove_undefined: bool,
    pub remove_empty_strings: bool,
    pub remove_empty_arrays: bool,
    pub remove_empty_objects: bool,
    pub compact_numbers: bool,
    /// Decimal places kept by `compact_numbers`.
    pub number_precision: u32,
}

impl Default for ZiOptimizeOptions {
    fn default() -> Self {
        Self {
            remove_null: false,
            remove_undefined: false,
            remove_empty_strings: false,
            remove_empty_arrays: false,
            remove_empty_objects: false,
            compact_numbers: false,
            number_precision: 6,
        }
    }
}

impl ZiOptimizeOptions {
    /// Every removal and compaction flag on.
    pub fn aggressive() -> Self {
        Self {
            remove_null: true,
            remove_undefined: true,
            remove_empty_strings: true,
            remove_empty_arrays: true,
            remove_empty_objects: true,
            compact_numbers: true,
            ..Default::default()
        }
    }

    pub fn from_json(config: &Value) -> Result<Self> {
        let obj = config::as_object(config, "optimize")?;
        let precision = config::count_opt(obj, "number_precision", "optimize")?.unwrap_or(6);
        let number_precision = u32::try_from(precision)
            .ok()
            .filter(|p| *p <= MAX_PRECISION)
            .ok_or_else(|| {
                ZiError::validation(format!("optimize 'number_precision' must be <= {}", MAX_PRECISION))
            })?;

        Ok(Self {
            remove_null: config::bool_or(obj, "remove_null", false, "optimize")?,
            remove_undefined: config::bool_or(obj, "remove_undefined", false, "optimize")?,
            remove_empty_strings: config::bool_or(obj, "remove_empty_strings", false, "optimize")?,
            remove_empty_arrays: config::bool_or(obj, "remove_empty_arrays", false, "optimize")?,
            remove_empty_objects: config::bool_or(obj, "remove_empty_objects", false, "optimize")?,
            compact_numbers: config::bool_or(obj, "compact_numbers", false, "optimize")?,
            number_precision,
        })
    }
}

/// Returns an optimized copy of `value`.
///
/// Children are optimized before their container is judged, so a container
/// emptied by removals is itself removed when its flag is set. The root is
/// always kept. Applying the pass twice equals applying it once.
pub fn optimize(value: &Value, options: &ZiOptimizeOptions) -> Value {
    optimize_node(value, options).unwrap_or_else(|| match value {
        Value::Array(_) => Value::Array(Vec::new()),
        Value::Object(_) => Value::Object(Map::new()),
        _ => Value::Null,
    })
}

fn optimize_node(value: &Value, options: &ZiOptimizeOptions) -> Option<Value> {
    match value {
        Value::Null if options.remove_null => None,
        Value::String(s) if s.is_empty() && options.remove_empty_strings => None,
        Value::Number(n) if options.compact_numbers => Some(Value::Number(compact(n, options.number_precision))),
        Value::Array(items) => {
            let kept: Vec<Value> = items.iter().filter_map(|item| optimize_node(item, options)).collect();
            if kept.is_empty() && options.remove_empty_arrays {
                None
            } else {
                Some(Value::Array(kept))
            }
        }
        Value::Object(fields) => {
            let kept: Map<String, Value> = fields
                .iter()
                .filter_map(|(key, field)| optimize_node(field, options).map(|v| (key.clone(), v)))
                .collect();
            if kept.is_empty() && options.remove_empty_objects {
                None
            } else {
                Some(Value::Object(kept))
            }
        }
        other => Some(other.clone()),
    }
}

fn compact(number: &Number, precision: u32) -> Number {
    if number.is_i64() || number.is_u64() {
        return number.clone();
    }
    let Some(x) = number.as_f64() else {
        return number.clone();
    };
    // Beyond 1e15 the scaled value loses integer precision.
    if x.abs() >= 1e15 {
        return number.clone();
    }
    let factor = 10f64.powi(precision as i32);
    let rounded = (x * factor).round() / factor;
    Number::from_f64(rounded).unwrap_or_else(|| number.clone())
}
