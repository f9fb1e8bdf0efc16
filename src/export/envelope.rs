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

//! # Envelope Builder
//!
//! Wraps projected content and metadata into one of three shapes:
//!
//! - **simple**: the content itself
//! - **envelope**: `{success: true, data, metadata?}`
//! - **structured** (default): `{data, metadata?}` where metadata leads with
//!   `exportFormat` and `recordCount`

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config;
use crate::errors::{Result, ZiError};
use crate::record::ZiMetadata;

/// Output shape of a structured export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZiEnvelopeFormat {
    Simple,
    Envelope,
    #[default]
    Structured,
}

impl ZiEnvelopeFormat {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "simple" => Ok(ZiEnvelopeFormat::Simple),
            "envelope" => Ok(ZiEnvelopeFormat::Envelope),
            "structured" => Ok(ZiEnvelopeFormat::Structured),
            other => Err(ZiError::validation(format!(
                "unknown envelope format '{}', expected simple, envelope or structured",
                other
            ))),
        }
    }
}

/// Envelope configuration.
#[derive(Clone, Debug, Serialize)]
pub struct ZiEnvelopeOptions {
    pub format: ZiEnvelopeFormat,
    pub data_key: String,
    pub metadata_key: String,
    pub include_metadata: bool,
    pub include_timestamp: bool,
    /// Value reported as `exportFormat` in the structured shape.
    pub export_format: String,
    pub timezone: String,
    /// Fixed export time; the current time when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

impl Default for ZiEnvelopeOptions {
    fn default() -> Self {
        Self {
            format: ZiEnvelopeFormat::Structured,
            data_key: "data".to_string(),
            metadata_key: "metadata".to_string(),
            include_metadata: true,
            include_timestamp: true,
            export_format: "json".to_string(),
            timezone: "UTC".to_string(),
            exported_at: None,
        }
    }
}

impl ZiEnvelopeOptions {
    pub fn with_format(mut self, format: ZiEnvelopeFormat) -> Self {
        self.format = format;
        self
    }

    /// Reads envelope keys from an export options object.
    pub fn from_json(config: &Value) -> Result<Self> {
        let obj = config::as_object(config, "envelope")?;
        let defaults = Self::default();

        let format = match config::string_opt(obj, "format", "envelope")? {
            Some(name) => ZiEnvelopeFormat::parse(&name)?,
            None => defaults.format,
        };
        let exported_at = match config::string_opt(obj, "exported_at", "envelope")? {
            Some(text) => Some(
                DateTime::parse_from_rfc3339(&text)
                    .map_err(|err| ZiError::validation(format!("envelope 'exported_at' is not RFC 3339: {}", err)))?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        Ok(Self {
            format,
            data_key: config::string_or(obj, "data_key", &defaults.data_key, "envelope")?,
            metadata_key: config::string_or(obj, "metadata_key", &defaults.metadata_key, "envelope")?,
            include_metadata: config::bool_or(obj, "include_metadata", true, "envelope")?,
            include_timestamp: config::bool_or(obj, "include_timestamp", true, "envelope")?,
            export_format: config::string_or(obj, "export_format", &defaults.export_format, "envelope")?,
            timezone: config::string_or(obj, "timezone", &defaults.timezone, "envelope")?,
            exported_at,
        })
    }

    fn timestamp(&self) -> String {
        self.exported_at
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// `content.len()` for lists, otherwise 1.
pub fn record_count(content: &Value) -> usize {
    match content {
        Value::Array(items) => items.len(),
        _ => 1,
    }
}

/// Wraps `content` according to `options.format`.
pub fn build_envelope(content: Value, metadata: &ZiMetadata, options: &ZiEnvelopeOptions) -> Value {
    match options.format {
        ZiEnvelopeFormat::Simple => content,
        ZiEnvelopeFormat::Envelope => {
            let mut envelope = Map::new();
            envelope.insert("success".to_string(), Value::Bool(true));
            let meta = options.include_metadata.then(|| {
                let mut block = metadata.clone();
                if options.include_timestamp {
                    block.insert("exportedAt".to_string(), Value::String(options.timestamp()));
                }
                block
            });
            envelope.insert(options.data_key.clone(), content);
            if let Some(block) = meta {
                envelope.insert(options.metadata_key.clone(), Value::Object(block));
            }
            Value::Object(envelope)
        }
        ZiEnvelopeFormat::Structured => {
            let mut envelope = Map::new();
            let meta = options.include_metadata.then(|| {
                let mut block = Map::new();
                block.insert("exportFormat".to_string(), Value::String(options.export_format.clone()));
                block.insert("recordCount".to_string(), Value::from(record_count(&content)));
                for (key, value) in metadata {
                    block.insert(key.clone(), value.clone());
                }
                if options.include_timestamp {
                    block.insert("exportedAt".to_string(), Value::String(options.timestamp()));
                    block.insert("timezone".to_string(), Value::String(options.timezone.clone()));
                }
                block
            });
            envelope.insert(options.data_key.clone(), content);
            if let Some(block) = meta {
                envelope.insert(options.metadata_key.clone(), Value::Object(block));
            }
            Value::Object(envelope)
        }
    }
}
