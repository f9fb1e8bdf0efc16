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

//! Record ordering.
//!
//! Values compare numerically when both sides are numeric (null as 0, booleans
//! as 0/1), lexicographically when both are strings. Across kinds, numbers sort
//! before strings, and absent or structured values sort last.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::errors::{Result, ZiError};
use crate::project::path;

type CompareFn = dyn Fn(&Value, &Value) -> Ordering + Send + Sync;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZiSortOrder {
    #[default]
    Asc,
    Desc,
}

/// One key of a multi-key sort.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiSortKey {
    pub field: String,
    #[serde(default)]
    pub order: ZiSortOrder,
}

impl ZiSortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: ZiSortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: ZiSortOrder::Desc,
        }
    }
}

/// Named comparator over two original records.
#[derive(Clone)]
pub struct ZiComparator {
    name: String,
    func: Arc<CompareFn>,
}

impl ZiComparator {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ZiComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ZiComparator").field(&self.name).finish()
    }
}

/// Sort specification.
#[derive(Clone, Debug)]
pub enum ZiSort {
    /// Ascending by one field. Order among equal keys is not guaranteed.
    Field(String),
    /// Caller comparator, applied with a stable sort.
    Comparator(ZiComparator),
    /// Lexicographic multi-key comparison, applied with a stable sort.
    Keys(Vec<ZiSortKey>),
}

impl ZiSort {
    pub fn comparator<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        ZiSort::Comparator(ZiComparator::new(name, func))
    }

    /// Accepts a field name, a `{field, order}` object or a list of either.
    pub fn from_json(config: &Value) -> Result<Self> {
        match config {
            Value::String(field) => Ok(ZiSort::Field(field.clone())),
            Value::Object(_) => Ok(ZiSort::Keys(vec![sort_key_from_json(config)?])),
            Value::Array(keys) => Ok(ZiSort::Keys(
                keys.iter().map(sort_key_from_json).collect::<Result<Vec<_>>>()?,
            )),
            other => Err(ZiError::validation(format!(
                "sort must be a field name, key object or list, got {}",
                other
            ))),
        }
    }

    /// Sorts `items` by the record each one refers to.
    pub fn apply<T, F>(&self, items: &mut [T], record: F)
    where
        F: Fn(&T) -> &Value,
    {
        match self {
            ZiSort::Field(field) => items.sort_unstable_by(|a, b| {
                compare_values(path::get(record(a), field), path::get(record(b), field))
            }),
            ZiSort::Comparator(comparator) => {
                items.sort_by(|a, b| (comparator.func)(record(a), record(b)))
            }
            ZiSort::Keys(keys) => items.sort_by(|a, b| compare_by_keys(record(a), record(b), keys)),
        }
    }
}

fn sort_key_from_json(config: &Value) -> Result<ZiSortKey> {
    match config {
        Value::String(field) => Ok(ZiSortKey::asc(field.clone())),
        _ => serde_json::from_value(config.clone())
            .map_err(|err| ZiError::validation(format!("invalid sort key: {}", err))),
    }
}

impl Serialize for ZiSort {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ZiSort::Field(field) => serializer.serialize_str(field),
            ZiSort::Keys(keys) => keys.serialize(serializer),
            ZiSort::Comparator(comparator) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("comparator", comparator.name())?;
                map.end()
            }
        }
    }
}

enum SortValue<'a> {
    Number(f64),
    Text(&'a str),
    Missing,
}

fn classify(value: Option<&Value>) -> SortValue<'_> {
    match value {
        Some(Value::Null) => SortValue::Number(0.0),
        Some(Value::Bool(b)) => SortValue::Number(if *b { 1.0 } else { 0.0 }),
        Some(Value::Number(n)) => n.as_f64().map_or(SortValue::Missing, SortValue::Number),
        Some(Value::String(s)) => SortValue::Text(s),
        _ => SortValue::Missing,
    }
}

/// Total order over optional JSON values, used by field and key sorts.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (classify(a), classify(b)) {
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(&y),
        (SortValue::Text(x), SortValue::Text(y)) => x.cmp(y),
        (SortValue::Number(_), _) => Ordering::Less,
        (_, SortValue::Number(_)) => Ordering::Greater,
        (SortValue::Text(_), SortValue::Missing) => Ordering::Less,
        (SortValue::Missing, SortValue::Text(_)) => Ordering::Greater,
        (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
    }
}

fn compare_by_keys(a: &Value, b: &Value, keys: &[ZiSortKey]) -> Ordering {
    for key in keys {
        let ordering = compare_values(path::get(a, &key.field), path::get(b, &key.field));
        let ordering = match key.order {
            ZiSortOrder::Asc => ordering,
            ZiSortOrder::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
