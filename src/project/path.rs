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

use serde_json::{Map, Value};

/// Dotted path into a nested record, e.g. `customer.address.city`.
///
/// Segments are kept verbatim (no trimming), so any string is a valid path
/// and `get(set({}, p, v), p) == v` holds for every `p`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZiFieldPath {
    segments: Vec<String>,
}

impl ZiFieldPath {
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path.split('.').map(|segment| segment.to_string()).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walks the record; `None` at the first missing or non-container segment.
    pub fn resolve<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        let mut current = record;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Assigns `value`, creating intermediate objects as needed.
    ///
    /// A non-object root or intermediate value is replaced by an empty object.
    pub fn set_value(&self, record: &mut Value, value: Value) {
        let Some((last, parents)) = self.segments.split_last() else {
            return;
        };

        let mut current = ensure_object(record);
        for segment in parents {
            let slot = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            current = ensure_object(slot);
        }
        current.insert(last.clone(), value);
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}

/// Reads `path` from `record`. Never panics.
pub fn get<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    ZiFieldPath::parse(path).resolve(record)
}

/// Writes `value` at `path` inside `record`.
pub fn set(record: &mut Value, path: &str, value: Value) {
    ZiFieldPath::parse(path).set_value(record, value);
}
