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

//! # Tabular Export
//!
//! Assembles a workbook and renders it through the provided backend.
//! Cancellation is checked at start, after the backend is loaded, around
//! every dataset and before the backend writes.

use serde::Serialize;
use serde_json::Value;

use crate::artifact::{ensure_extension, ZiArtifact, ZiArtifactFormat};
use crate::cancel::ZiCancelToken;
use crate::config;
use crate::errors::Result;
use crate::export::backend::{ZiBackendProvider, ZiBookType, ZiWriteOptions};
use crate::export::rows::ZiRowOptions;
use crate::export::sheet::ZiSheetOptions;
use crate::export::workbook::{assemble_workbook, ZiTemplate, ZiWorkbookOptions};
use crate::process::ZiProcessingOptions;
use crate::record::{ZiDataset, ZiExportInput};
use crate::schema::{ZiColumnSpec, ZiFormatterRegistry};
use crate::validate::validate_tabular;

const SPREADSHEET_EXTENSIONS: [&str; 3] = [".xlsx", ".csv", ".zip"];

/// Options for [`export_tabular`].
#[derive(Clone, Debug, Serialize)]
pub struct ZiTabularExportOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ZiColumnSpec>>,
    pub filename: String,
    pub validate_input: bool,
    pub write: ZiWriteOptions,
    pub workbook: ZiWorkbookOptions,
}

impl Default for ZiTabularExportOptions {
    fn default() -> Self {
        Self {
            columns: None,
            filename: "export.xlsx".to_string(),
            validate_input: true,
            write: ZiWriteOptions::default(),
            workbook: ZiWorkbookOptions::default(),
        }
    }
}

impl ZiTabularExportOptions {
    pub fn with_columns(mut self, columns: Vec<ZiColumnSpec>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn with_book_type(mut self, book_type: ZiBookType) -> Self {
        self.write.book_type = book_type;
        self
    }

    pub fn with_template(mut self, template: ZiTemplate) -> Self {
        self.workbook.template = Some(template);
        self
    }

    /// Parses tabular options.
    ///
    /// Row keys (`include_headers`, `null_value`, ...), sheet keys
    /// (`auto_fit_columns`, `freeze_top_row`) and processing keys sit at the
    /// top level next to `book_type`, `compression` and `sheet_name`;
    /// `template` is a nested object.
    pub fn from_json(config: &Value, registry: &ZiFormatterRegistry) -> Result<Self> {
        let ctx = "tabular export";
        let obj = config::as_object(config, ctx)?;

        let book_type = match config::string_opt(obj, "book_type", ctx)? {
            Some(name) => ZiBookType::parse(&name)?,
            None => ZiBookType::default(),
        };

        Ok(Self {
            columns: config::present(obj, "columns")
                .map(|columns| ZiColumnSpec::list_from_json(columns, registry))
                .transpose()?,
            filename: config::string_or(obj, "filename", "export.xlsx", ctx)?,
            validate_input: config::bool_or(obj, "validate_input", true, ctx)?,
            write: ZiWriteOptions {
                book_type,
                compression: config::bool_or(obj, "compression", true, ctx)?,
            },
            workbook: ZiWorkbookOptions {
                rows: ZiRowOptions::from_json(config)?,
                sheet: ZiSheetOptions::from_json(config)?,
                sheet_name: config::string_or(obj, "sheet_name", "Sheet1", ctx)?,
                processing: ZiProcessingOptions::from_json(config)?,
                template: config::present(obj, "template")
                    .map(ZiTemplate::from_json)
                    .transpose()?,
            },
        })
    }
}

/// Exports `input` as a spreadsheet artifact.
pub async fn export_tabular<P>(
    input: &ZiExportInput,
    options: &ZiTabularExportOptions,
    provider: &P,
    cancel: &ZiCancelToken,
) -> Result<ZiArtifact>
where
    P: ZiBackendProvider + ?Sized,
{
    cancel.checkpoint("start")?;
    log::info!(
        "export.tabular.start: exporting workbook - datasets={}, records={}, book_type={:?}",
        input.datasets().len(),
        input.record_count(),
        options.write.book_type
    );

    let columns = options.columns.as_deref();
    if options.validate_input {
        for dataset in input.datasets() {
            validate_tabular(dataset, columns, options.workbook.rows.include_headers)
                .into_result(&dataset.name)?;
        }
    }

    let backend = provider.load().await?;
    log::info!("export.tabular.backend_loaded: backend ready - backend={}", backend.name());
    cancel.checkpoint("backend loaded")?;

    let workbook = assemble_workbook(input, columns, &options.workbook, cancel)?;
    let sheet_count = workbook.sheet_count();

    cancel.checkpoint("serialize")?;
    let payload = backend.write(&workbook, &options.write)?;
    let resolved = serde_json::to_value(options)?;

    log::info!(
        "export.tabular.done: workbook rendered - sheets={}, bytes={}, backend={}",
        sheet_count,
        payload.len(),
        backend.name()
    );

    let book_type = options.write.book_type;
    Ok(ZiArtifact::new(
        payload,
        tabular_filename(&options.filename, book_type.extension(sheet_count)),
        ZiArtifactFormat::Tabular,
        book_type.content_type(sheet_count),
        resolved,
    )
    .with_sheet_count(sheet_count))
}

/// Replaces a mismatched spreadsheet extension, otherwise appends `ext`.
fn tabular_filename(filename: &str, ext: &str) -> String {
    let lower = filename.to_ascii_lowercase();
    let wanted = format!(".{}", ext);
    let base = SPREADSHEET_EXTENSIONS
        .iter()
        .find(|known| **known != wanted && lower.ends_with(**known))
        .map_or(filename, |known| &filename[..filename.len() - known.len()]);
    ensure_extension(base, ext)
}

/// One sheet from one dataset.
pub async fn export_single_sheet<P>(
    dataset: ZiDataset,
    options: &ZiTabularExportOptions,
    provider: &P,
    cancel: &ZiCancelToken,
) -> Result<ZiArtifact>
where
    P: ZiBackendProvider + ?Sized,
{
    export_tabular(&ZiExportInput::Single(dataset), options, provider, cancel).await
}

/// One sheet per named dataset.
pub async fn export_multiple_sheets<P>(
    datasets: Vec<ZiDataset>,
    options: &ZiTabularExportOptions,
    provider: &P,
    cancel: &ZiCancelToken,
) -> Result<ZiArtifact>
where
    P: ZiBackendProvider + ?Sized,
{
    export_tabular(&ZiExportInput::Multiple(datasets), options, provider, cancel).await
}

/// Tabular export with title, subtitle and summary rows above the grid.
pub async fn export_with_template<P>(
    input: &ZiExportInput,
    template: ZiTemplate,
    options: &ZiTabularExportOptions,
    provider: &P,
    cancel: &ZiCancelToken,
) -> Result<ZiArtifact>
where
    P: ZiBackendProvider + ?Sized,
{
    let options = options.clone().with_template(template);
    export_tabular(input, &options, provider, cancel).await
}

/// Parses input and options from JSON, then runs [`export_tabular`].
pub async fn export_tabular_json<P>(
    input: &Value,
    options: &Value,
    registry: &ZiFormatterRegistry,
    provider: &P,
    cancel: &ZiCancelToken,
) -> Result<ZiArtifact>
where
    P: ZiBackendProvider + ?Sized,
{
    let input = ZiExportInput::from_json(input, registry)?;
    let options = ZiTabularExportOptions::from_json(options, registry)?;
    export_tabular(&input, &options, provider, cancel).await
}
