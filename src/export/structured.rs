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

//! # Structured Export
//!
//! Runs every dataset through the processor, wraps the result in an envelope
//! and renders it to JSON text.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::artifact::{ensure_extension, ZiArtifact, ZiArtifactFormat};
use crate::cancel::ZiCancelToken;
use crate::config;
use crate::errors::{Result, ZiError};
use crate::export::envelope::{build_envelope, ZiEnvelopeFormat, ZiEnvelopeOptions};
use crate::export::optimizer::{optimize, ZiOptimizeOptions};
use crate::process::{process, ZiProcessingOptions};
use crate::project::ZiProjectionOptions;
use crate::record::{ZiDataset, ZiExportInput, ZiMetadata};
use crate::schema::{ZiColumnSpec, ZiFormatterRegistry};
use crate::validate::validate_dataset;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Widest accepted indentation, in spaces per level.
pub const MAX_INDENT: usize = 16;

/// Options for [`export_structured`].
#[derive(Clone, Debug, Serialize)]
pub struct ZiStructuredExportOptions {
    /// Export-level schema; datasets with their own columns override it.
    /// Without any schema, records are exported as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ZiColumnSpec>>,
    pub filename: String,
    /// Spaces per indentation level; 0 renders compact JSON.
    pub indent: usize,
    pub validate_input: bool,
    pub envelope: ZiEnvelopeOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branding: Option<ZiMetadata>,
    /// Extra entries merged into the metadata block.
    pub metadata: ZiMetadata,
    pub processing: ZiProcessingOptions,
    pub projection: ZiProjectionOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimize: Option<ZiOptimizeOptions>,
}

impl Default for ZiStructuredExportOptions {
    fn default() -> Self {
        Self {
            columns: None,
            filename: "export.json".to_string(),
            indent: 2,
            validate_input: true,
            envelope: ZiEnvelopeOptions::default(),
            branding: None,
            metadata: ZiMetadata::new(),
            processing: ZiProcessingOptions::default(),
            projection: ZiProjectionOptions::default(),
            optimize: None,
        }
    }
}

impl ZiStructuredExportOptions {
    pub fn with_columns(mut self, columns: Vec<ZiColumnSpec>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn with_format(mut self, format: ZiEnvelopeFormat) -> Self {
        self.envelope.format = format;
        self
    }

    /// Parses export options.
    ///
    /// Envelope keys (`format`, `data_key`, `include_metadata`, ...) and
    /// processing keys (`filter`, `sort`, `limit`, `offset`) sit at the top
    /// level; `projection` and `optimize` are nested objects.
    pub fn from_json(config: &Value, registry: &ZiFormatterRegistry) -> Result<Self> {
        let obj = config::as_object(config, "structured export")?;
        let ctx = "structured export";

        let indent = config::count_opt(obj, "indent", ctx)?.unwrap_or(2);
        if indent > MAX_INDENT {
            return Err(ZiError::validation(format!(
                "{} 'indent' must be <= {}, got {}",
                ctx, MAX_INDENT, indent
            )));
        }
        Ok(Self {
            columns: config::present(obj, "columns")
                .map(|columns| ZiColumnSpec::list_from_json(columns, registry))
                .transpose()?,
            filename: config::string_or(obj, "filename", "export.json", ctx)?,
            indent,
            validate_input: config::bool_or(obj, "validate_input", true, ctx)?,
            envelope: ZiEnvelopeOptions::from_json(config)?,
            branding: config::metadata_opt(obj, "branding", ctx)?,
            metadata: config::metadata_opt(obj, "metadata", ctx)?.unwrap_or_default(),
            processing: ZiProcessingOptions::from_json(config)?,
            projection: config::present(obj, "projection")
                .map(ZiProjectionOptions::from_json)
                .transpose()?
                .unwrap_or_default(),
            optimize: config::present(obj, "optimize")
                .map(ZiOptimizeOptions::from_json)
                .transpose()?,
        })
    }
}

/// Renders `value` with `indent` spaces per level, compact when 0.
pub fn serialize_json(value: &Value, indent: usize) -> Result<Vec<u8>> {
    if indent > MAX_INDENT {
        return Err(ZiError::validation(format!(
            "indent must be <= {}, got {}",
            MAX_INDENT, indent
        )));
    }
    if indent == 0 {
        return Ok(serde_json::to_vec(value)?);
    }
    let indent = b" ".repeat(indent);
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(&indent);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Exports `input` as a JSON artifact.
///
/// A single dataset becomes a list of projected rows. Several datasets
/// become an object keyed by unique dataset name, placed under `datasets`,
/// with a per-dataset summary in the metadata block.
pub fn export_structured(
    input: &ZiExportInput,
    options: &ZiStructuredExportOptions,
    cancel: &ZiCancelToken,
) -> Result<ZiArtifact> {
    cancel.checkpoint("start")?;
    log::info!(
        "export.structured.start: exporting datasets - datasets={}, records={}, format={:?}",
        input.datasets().len(),
        input.record_count(),
        options.envelope.format
    );

    if options.validate_input {
        for dataset in input.datasets() {
            validate_dataset(dataset, options.columns.as_deref()).into_result(&dataset.name)?;
        }
    }

    let mut metadata = options.metadata.clone();
    let mut envelope = options.envelope.clone();

    let content = match input {
        ZiExportInput::Single(dataset) => Value::Array(run_dataset(dataset, options, cancel)?),
        ZiExportInput::Multiple(datasets) => {
            let mut outputs = Map::new();
            let mut summaries = Vec::with_capacity(datasets.len());
            let mut total = 0usize;

            for dataset in datasets {
                let rows = run_dataset(dataset, options, cancel)?;
                let name = unique_name(&outputs, &dataset.name);
                let columns: Vec<Value> = match dataset.columns.as_deref().or(options.columns.as_deref()) {
                    Some(columns) => columns.iter().map(|c| Value::from(c.output_key())).collect(),
                    None => rows
                        .first()
                        .and_then(Value::as_object)
                        .map(|row| row.keys().map(|k| Value::from(k.as_str())).collect())
                        .unwrap_or_default(),
                };

                total += rows.len();
                summaries.push(serde_json::json!({
                    "name": name,
                    "recordCount": rows.len(),
                    "columns": columns,
                }));
                outputs.insert(name, Value::Array(rows));
            }

            metadata.insert("datasetsCount".to_string(), Value::from(datasets.len()));
            metadata.insert("totalRecords".to_string(), Value::from(total));
            metadata.insert("datasets".to_string(), Value::Array(summaries));
            envelope.data_key = "datasets".to_string();
            Value::Object(outputs)
        }
    };

    let content = match &options.optimize {
        Some(optimize_options) => optimize(&content, optimize_options),
        None => content,
    };

    if let Some(branding) = &options.branding {
        metadata.insert("branding".to_string(), Value::Object(branding.clone()));
    }

    let document = build_envelope(content, &metadata, &envelope);

    cancel.checkpoint("serialize")?;
    let payload = serialize_json(&document, options.indent)?;
    let resolved = serde_json::to_value(options)?;

    log::info!(
        "export.structured.done: artifact rendered - bytes={}, filename={}",
        payload.len(),
        options.filename
    );

    Ok(ZiArtifact::new(
        payload,
        ensure_extension(&options.filename, "json"),
        ZiArtifactFormat::Json,
        JSON_CONTENT_TYPE,
        resolved,
    ))
}

fn run_dataset(
    dataset: &ZiDataset,
    options: &ZiStructuredExportOptions,
    cancel: &ZiCancelToken,
) -> Result<Vec<Value>> {
    cancel.checkpoint(&format!("before dataset '{}'", dataset.name))?;

    let processing = dataset.options.as_ref().unwrap_or(&options.processing);
    let rows = match dataset.columns.as_deref().or(options.columns.as_deref()) {
        Some(columns) => process(&dataset.data, columns, processing, &options.projection),
        None => {
            let passthrough = ZiProjectionOptions {
                include_all_fields: true,
                ..options.projection.clone()
            };
            process(&dataset.data, &[], processing, &passthrough)
        }
    };

    log::info!(
        "export.dataset.processed: dataset projected - name={}, input={}, output={}",
        dataset.name,
        dataset.data.len(),
        rows.len()
    );

    cancel.checkpoint(&format!("after dataset '{}'", dataset.name))?;
    Ok(rows)
}

fn unique_name(taken: &Map<String, Value>, name: &str) -> String {
    if !taken.contains_key(name) {
        return name.to_string();
    }
    (2..)
        .map(|n| format!("{}__{}", name, n))
        .find(|candidate| !taken.contains_key(candidate))
        .unwrap_or_else(|| name.to_string())
}

/// Projection-only export: the processed rows with no envelope.
pub fn export_projection(
    input: &ZiExportInput,
    options: &ZiStructuredExportOptions,
    cancel: &ZiCancelToken,
) -> Result<ZiArtifact> {
    let options = options.clone().with_format(ZiEnvelopeFormat::Simple);
    export_structured(input, &options, cancel)
}

/// Exports several named datasets in one structured document.
pub fn export_datasets(
    datasets: Vec<ZiDataset>,
    options: &ZiStructuredExportOptions,
    cancel: &ZiCancelToken,
) -> Result<ZiArtifact> {
    export_structured(&ZiExportInput::Multiple(datasets), options, cancel)
}

/// Export in the `{success, data, metadata}` envelope shape.
pub fn export_enveloped(
    input: &ZiExportInput,
    options: &ZiStructuredExportOptions,
    cancel: &ZiCancelToken,
) -> Result<ZiArtifact> {
    let options = options.clone().with_format(ZiEnvelopeFormat::Envelope);
    export_structured(input, &options, cancel)
}

/// Parses input and options from JSON, then runs [`export_structured`].
pub fn export_structured_json(
    input: &Value,
    options: &Value,
    registry: &ZiFormatterRegistry,
    cancel: &ZiCancelToken,
) -> Result<ZiArtifact> {
    let input = ZiExportInput::from_json(input, registry)?;
    let options = ZiStructuredExportOptions::from_json(options, registry)?;
    export_structured(&input, &options, cancel)
}
