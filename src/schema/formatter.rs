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

//! Named value formatters and the registry used to resolve them from
//! configuration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::errors::{Result, ZiError};

type FormatFn = dyn Fn(&Value, &Value) -> Result<Value> + Send + Sync;
type ComputeFn = dyn Fn(&Value) -> Value + Send + Sync;

/// Named pure function `(value, row) -> value` applied to one column.
///
/// The name identifies the formatter in logs and in the resolved options
/// recorded on every artifact.
#[derive(Clone)]
pub struct ZiFormatter {
    name: String,
    func: Arc<FormatFn>,
}

impl ZiFormatter {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the formatter against `value`, with `row` being the source record.
    pub fn apply(&self, value: &Value, row: &Value) -> Result<Value> {
        (self.func)(value, row)
    }
}

impl fmt::Debug for ZiFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ZiFormatter").field(&self.name).finish()
    }
}

impl Serialize for ZiFormatter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

/// Named function of the source row, used as a computed default value.
#[derive(Clone)]
pub struct ZiRowFunction {
    name: String,
    func: Arc<ComputeFn>,
}

impl ZiRowFunction {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, row: &Value) -> Value {
        (self.func)(row)
    }
}

impl fmt::Debug for ZiRowFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ZiRowFunction").field(&self.name).finish()
    }
}

/// Lookup table from formatter names to implementations.
///
/// Built per caller; nothing is registered globally.
#[derive(Clone, Debug, Default)]
pub struct ZiFormatterRegistry {
    formatters: HashMap<String, ZiFormatter>,
    functions: HashMap<String, ZiRowFunction>,
}

impl ZiFormatterRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the built-in formatters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(ZiFormatter::new("string.upper", |value, _| {
            Ok(map_str(value, |s| s.to_uppercase()))
        }));
        registry.register(ZiFormatter::new("string.lower", |value, _| {
            Ok(map_str(value, |s| s.to_lowercase()))
        }));
        registry.register(ZiFormatter::new("string.trim", |value, _| {
            Ok(map_str(value, |s| s.trim().to_string()))
        }));
        registry.register(ZiFormatter::new("number.round2", |value, _| {
            round_number(value, 2, "number.round2")
        }));
        registry.register(ZiFormatter::new("number.percent", |value, _| match value {
            Value::Null => Ok(Value::Null),
            _ => {
                let n = value.as_f64().ok_or_else(|| {
                    ZiError::formatter("number.percent", format!("expected number, got {}", value))
                })?;
                Ok(Value::String(format!("{:.1}%", n * 100.0)))
            }
        }));
        registry.register(ZiFormatter::new("value.json", |value, _| {
            Ok(Value::String(serde_json::to_string(value)?))
        }));
        registry.register(ZiFormatter::new("bool.yes_no", |value, _| match value {
            Value::Bool(true) => Ok(Value::String("Yes".to_string())),
            Value::Bool(false) => Ok(Value::String("No".to_string())),
            other => Ok(other.clone()),
        }));
        registry
    }

    pub fn register(&mut self, formatter: ZiFormatter) {
        self.formatters.insert(formatter.name().to_string(), formatter);
    }

    pub fn register_function(&mut self, function: ZiRowFunction) {
        self.functions.insert(function.name().to_string(), function);
    }

    pub fn formatter(&self, name: &str) -> Result<ZiFormatter> {
        self.formatters
            .get(name)
            .cloned()
            .ok_or_else(|| ZiError::validation(format!("unknown formatter '{}'", name)))
    }

    pub fn function(&self, name: &str) -> Result<ZiRowFunction> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| ZiError::validation(format!("unknown row function '{}'", name)))
    }
}

fn map_str(value: &Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(s)),
        other => other.clone(),
    }
}

fn round_number(value: &Value, decimals: i32, name: &str) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        Value::Number(n) => {
            let factor = 10f64.powi(decimals);
            let rounded = n.as_f64().map(|x| (x * factor).round() / factor);
            Ok(rounded
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| value.clone()))
        }
        other => Err(ZiError::formatter(name, format!("expected number, got {}", other))),
    }
}
