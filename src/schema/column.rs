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

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::errors::{Result, ZiError};
use crate::project::path;
use crate::schema::formatter::{ZiFormatter, ZiFormatterRegistry, ZiRowFunction};

/// Default substituted when a column resolves to an absent or null value.
#[derive(Clone, Debug)]
pub enum ZiDefaultValue {
    /// Literal value copied into the output.
    Literal(Value),
    /// Value computed from the source row.
    Computed(ZiRowFunction),
}

impl ZiDefaultValue {
    pub fn resolve(&self, row: &Value) -> Value {
        match self {
            ZiDefaultValue::Literal(value) => value.clone(),
            ZiDefaultValue::Computed(function) => function.call(row),
        }
    }
}

impl Serialize for ZiDefaultValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ZiDefaultValue::Literal(value) => value.serialize(serializer),
            ZiDefaultValue::Computed(function) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("computed", function.name())?;
                map.end()
            }
        }
    }
}

/// Structured column declaration.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ZiColumnDescriptor {
    /// Dotted source path.
    pub key: String,
    /// Dotted destination path; defaults to `key`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<ZiFormatter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ZiDefaultValue>,
    /// Schema applied to array elements or object values of this field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<Vec<ZiColumnSpec>>,
    /// Display label for tabular headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

impl ZiColumnDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_output_key(mut self, output_key: impl Into<String>) -> Self {
        self.output_key = Some(output_key.into());
        self
    }

    pub fn with_formatter(mut self, formatter: ZiFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(ZiDefaultValue::Literal(value));
        self
    }

    pub fn with_computed_default(mut self, function: ZiRowFunction) -> Self {
        self.default_value = Some(ZiDefaultValue::Computed(function));
        self
    }

    pub fn with_nested(mut self, nested: Vec<ZiColumnSpec>) -> Self {
        self.nested = Some(nested);
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }
}

/// One column of an export schema: a bare field name or a descriptor.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ZiColumnSpec {
    Simple(String),
    Descriptor(ZiColumnDescriptor),
}

impl ZiColumnSpec {
    pub fn field(name: impl Into<String>) -> Self {
        ZiColumnSpec::Simple(name.into())
    }

    pub fn key(&self) -> &str {
        match self {
            ZiColumnSpec::Simple(name) => name,
            ZiColumnSpec::Descriptor(descriptor) => &descriptor.key,
        }
    }

    pub fn output_key(&self) -> &str {
        match self {
            ZiColumnSpec::Simple(name) => name,
            ZiColumnSpec::Descriptor(descriptor) => {
                descriptor.output_key.as_deref().unwrap_or(&descriptor.key)
            }
        }
    }

    /// Header label: the declared header, falling back to the key.
    pub fn header_label(&self) -> &str {
        match self {
            ZiColumnSpec::Descriptor(ZiColumnDescriptor {
                header: Some(header),
                ..
            }) => header,
            _ => self.key(),
        }
    }

    pub fn descriptor(&self) -> Option<&ZiColumnDescriptor> {
        match self {
            ZiColumnSpec::Simple(_) => None,
            ZiColumnSpec::Descriptor(descriptor) => Some(descriptor),
        }
    }

    pub fn formatter(&self) -> Option<&ZiFormatter> {
        self.descriptor().and_then(|d| d.formatter.as_ref())
    }

    pub fn default_value(&self) -> Option<&ZiDefaultValue> {
        self.descriptor().and_then(|d| d.default_value.as_ref())
    }

    pub fn nested(&self) -> Option<&[ZiColumnSpec]> {
        self.descriptor().and_then(|d| d.nested.as_deref())
    }

    /// Reads the column from `row`, substituting the default for an absent
    /// or null value. `None` means the value is absent.
    pub fn source_value(&self, row: &Value) -> Option<Value> {
        let value = path::get(row, self.key()).cloned();
        match (value, self.default_value()) {
            (None | Some(Value::Null), Some(default)) => Some(default.resolve(row)),
            (value, _) => value,
        }
    }

    /// Runs the formatter over a present value.
    ///
    /// Absent values stay absent and never reach the formatter. A failing
    /// formatter is logged and the unformatted value is kept.
    pub fn format_value(&self, value: Option<Value>, row: &Value) -> Option<Value> {
        let Some(formatter) = self.formatter() else {
            return value;
        };
        let value = value?;
        match formatter.apply(&value, row) {
            Ok(formatted) => Some(formatted),
            Err(err) => {
                log::warn!(
                    "project.formatter.failed: keeping unformatted value - formatter={}, column={}, error={}",
                    formatter.name(),
                    self.key(),
                    err
                );
                Some(value)
            }
        }
    }

    /// Parses one column from configuration.
    ///
    /// Accepts a string or an object with `key`, `output_key`, `formatter`,
    /// `default`, `default_fn`, `nested` and `header` (alias `label`).
    pub fn from_json(config: &Value, registry: &ZiFormatterRegistry) -> Result<Self> {
        let obj = match config {
            Value::String(name) => return Ok(ZiColumnSpec::Simple(name.clone())),
            Value::Object(obj) => obj,
            other => {
                return Err(ZiError::validation(format!(
                    "column must be a string or object, got {}",
                    other
                )))
            }
        };

        let key = obj
            .get("key")
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ZiError::validation("column descriptor requires non-empty string 'key'"))?;

        let mut descriptor = ZiColumnDescriptor::new(key);
        descriptor.output_key = optional_str(obj.get("output_key"), "output_key")?;
        descriptor.header = match optional_str(obj.get("header"), "header")? {
            Some(header) => Some(header),
            None => optional_str(obj.get("label"), "label")?,
        };

        if let Some(name) = optional_str(obj.get("formatter"), "formatter")? {
            descriptor.formatter = Some(registry.formatter(&name)?);
        }

        if let Some(name) = optional_str(obj.get("default_fn"), "default_fn")? {
            descriptor.default_value = Some(ZiDefaultValue::Computed(registry.function(&name)?));
        } else if let Some(value) = obj.get("default") {
            descriptor.default_value = Some(ZiDefaultValue::Literal(value.clone()));
        }

        if let Some(nested) = obj.get("nested") {
            descriptor.nested = Some(Self::list_from_json(nested, registry)?);
        }

        Ok(ZiColumnSpec::Descriptor(descriptor))
    }

    /// Parses a column list; anything other than an array is rejected.
    pub fn list_from_json(config: &Value, registry: &ZiFormatterRegistry) -> Result<Vec<Self>> {
        config
            .as_array()
            .ok_or_else(|| ZiError::validation("columns must be a list"))?
            .iter()
            .map(|column| Self::from_json(column, registry))
            .collect()
    }
}

impl From<&str> for ZiColumnSpec {
    fn from(name: &str) -> Self {
        ZiColumnSpec::Simple(name.to_string())
    }
}

impl From<ZiColumnDescriptor> for ZiColumnSpec {
    fn from(descriptor: ZiColumnDescriptor) -> Self {
        ZiColumnSpec::Descriptor(descriptor)
    }
}

fn optional_str(value: Option<&Value>, field: &str) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ZiError::validation(format!("column '{}' must be a string", field))),
    }
}
