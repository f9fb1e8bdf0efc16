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

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::errors::{Result, ZiError};
use crate::project::path;

type PredicateFn = dyn Fn(&Value) -> bool + Send + Sync;

/// Declarative record predicate over a dotted path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ZiFilterRule {
    Equals { path: String, value: Value },
    NotEquals { path: String, value: Value },
    GreaterThan { path: String, value: f64 },
    LessThan { path: String, value: f64 },
    /// Inclusive on both bounds.
    Between { path: String, min: f64, max: f64 },
    Exists { path: String },
    /// Substring match on strings, element match on arrays.
    Contains { path: String, value: String },
    In { path: String, values: Vec<Value> },
}

impl ZiFilterRule {
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            ZiFilterRule::Equals { path, value } => path::get(record, path) == Some(value),
            // Absent fields are kept, as they are not equal to anything.
            ZiFilterRule::NotEquals { path, value } => path::get(record, path) != Some(value),
            ZiFilterRule::GreaterThan { path, value } => {
                number_at(record, path).is_some_and(|n| n > *value)
            }
            ZiFilterRule::LessThan { path, value } => {
                number_at(record, path).is_some_and(|n| n < *value)
            }
            ZiFilterRule::Between { path, min, max } => {
                number_at(record, path).is_some_and(|n| n >= *min && n <= *max)
            }
            ZiFilterRule::Exists { path } => {
                path::get(record, path).is_some_and(|value| !value.is_null())
            }
            ZiFilterRule::Contains { path, value } => match path::get(record, path) {
                Some(Value::String(text)) => text.contains(value.as_str()),
                Some(Value::Array(items)) => items.iter().any(|item| item.as_str() == Some(value.as_str())),
                _ => false,
            },
            ZiFilterRule::In { path, values } => {
                path::get(record, path).is_some_and(|found| values.contains(found))
            }
        }
    }
}

fn number_at(record: &Value, path: &str) -> Option<f64> {
    path::get(record, path).and_then(Value::as_f64)
}

/// Named caller-supplied predicate.
#[derive(Clone)]
pub struct ZiPredicate {
    name: String,
    func: Arc<PredicateFn>,
}

impl ZiPredicate {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
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

impl fmt::Debug for ZiPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ZiPredicate").field(&self.name).finish()
    }
}

/// Record filter evaluated against the original (unprojected) record.
#[derive(Clone, Debug)]
pub enum ZiFilter {
    Rule(ZiFilterRule),
    All(Vec<ZiFilter>),
    Any(Vec<ZiFilter>),
    Custom(ZiPredicate),
}

impl ZiFilter {
    pub fn predicate<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        ZiFilter::Custom(ZiPredicate::new(name, func))
    }

    pub fn matches(&self, record: &Value) -> bool {
        match self {
            ZiFilter::Rule(rule) => rule.matches(record),
            ZiFilter::All(filters) => filters.iter().all(|f| f.matches(record)),
            ZiFilter::Any(filters) => filters.iter().any(|f| f.matches(record)),
            ZiFilter::Custom(predicate) => (predicate.func)(record),
        }
    }

    /// Parses `{"all": [...]}`, `{"any": [...]}` or a rule tagged by `op`.
    pub fn from_json(config: &Value) -> Result<Self> {
        let obj = config
            .as_object()
            .ok_or_else(|| ZiError::validation("filter config must be object"))?;

        for (key, combinator) in [("all", true), ("any", false)] {
            if let Some(children) = obj.get(key) {
                let children = children
                    .as_array()
                    .ok_or_else(|| ZiError::validation(format!("filter '{}' must be an array", key)))?
                    .iter()
                    .map(Self::from_json)
                    .collect::<Result<Vec<_>>>()?;
                return Ok(if combinator {
                    ZiFilter::All(children)
                } else {
                    ZiFilter::Any(children)
                });
            }
        }

        serde_json::from_value(config.clone())
            .map(ZiFilter::Rule)
            .map_err(|err| ZiError::validation(format!("invalid filter rule: {}", err)))
    }
}

impl From<ZiFilterRule> for ZiFilter {
    fn from(rule: ZiFilterRule) -> Self {
        ZiFilter::Rule(rule)
    }
}

impl Serialize for ZiFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ZiFilter::Rule(rule) => rule.serialize(serializer),
            ZiFilter::All(filters) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("all", filters)?;
                map.end()
            }
            ZiFilter::Any(filters) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("any", filters)?;
                map.end()
            }
            ZiFilter::Custom(predicate) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("custom", predicate.name())?;
                map.end()
            }
        }
    }
}
