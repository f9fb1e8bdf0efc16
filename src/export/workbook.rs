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

use serde::Serialize;
use serde_json::Value;

use crate::cancel::ZiCancelToken;
use crate::config;
use crate::errors::Result;
use crate::export::rows::{to_cell, to_rows, ZiCell, ZiRowOptions};
use crate::export::sheet::{build_sheet, sanitize_sheet_name, ZiSheet, ZiSheetNamer, ZiSheetOptions};
use crate::process::{select_records, ZiProcessingOptions};
use crate::record::{ZiDataset, ZiExportInput, ZiMetadata};
use crate::schema::ZiColumnSpec;

/// Title block written above the data grid.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ZiTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Label/value pairs, one row each.
    pub summary: ZiMetadata,
}

impl ZiTemplate {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_summary(mut self, label: impl Into<String>, value: Value) -> Self {
        self.summary.insert(label.into(), value);
        self
    }

    pub fn from_json(config: &Value) -> Result<Self> {
        let obj = config::as_object(config, "template")?;
        Ok(Self {
            title: config::string_opt(obj, "title", "template")?,
            subtitle: config::string_opt(obj, "subtitle", "template")?,
            summary: config::metadata_opt(obj, "summary", "template")?.unwrap_or_default(),
        })
    }

    /// Title, subtitle and summary rows followed by one blank row.
    pub fn rows(&self, options: &ZiRowOptions) -> Vec<Vec<ZiCell>> {
        let mut rows = Vec::new();
        if let Some(title) = &self.title {
            rows.push(vec![ZiCell::text(title.as_str())]);
        }
        if let Some(subtitle) = &self.subtitle {
            rows.push(vec![ZiCell::text(subtitle.as_str())]);
        }
        for (label, value) in &self.summary {
            rows.push(vec![ZiCell::text(label.as_str()), to_cell(Some(value), options)]);
        }
        if !rows.is_empty() {
            rows.push(Vec::new());
        }
        rows
    }
}

/// Sheet-level settings shared by every sheet of a workbook.
#[derive(Clone, Debug, Serialize)]
pub struct ZiWorkbookOptions {
    pub rows: ZiRowOptions,
    pub sheet: ZiSheetOptions,
    /// Name of the sheet for a single dataset or an empty workbook.
    pub sheet_name: String,
    pub processing: ZiProcessingOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<ZiTemplate>,
}

impl Default for ZiWorkbookOptions {
    fn default() -> Self {
        Self {
            rows: ZiRowOptions::default(),
            sheet: ZiSheetOptions::default(),
            sheet_name: "Sheet1".to_string(),
            processing: ZiProcessingOptions::default(),
            template: None,
        }
    }
}

/// Ordered sheets ready for a backend.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZiWorkbook {
    pub sheets: Vec<ZiSheet>,
}

impl ZiWorkbook {
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheet(&self, name: &str) -> Option<&ZiSheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}

/// Builds one sheet per dataset.
///
/// A single dataset lands on `options.sheet_name`. Named datasets get
/// sanitized, de-duplicated sheet names and their own columns when declared.
/// An empty dataset list still yields one empty sheet.
pub fn assemble_workbook(
    input: &ZiExportInput,
    columns: Option<&[ZiColumnSpec]>,
    options: &ZiWorkbookOptions,
    cancel: &ZiCancelToken,
) -> Result<ZiWorkbook> {
    let fallback = columns.unwrap_or(&[]);
    let sheets = match input {
        ZiExportInput::Single(dataset) => {
            let name = sanitize_sheet_name(&options.sheet_name);
            vec![dataset_sheet(name, dataset, dataset.columns_or(fallback), options, cancel)?]
        }
        ZiExportInput::Multiple(datasets) if datasets.is_empty() => {
            vec![ZiSheet::empty(sanitize_sheet_name(&options.sheet_name))]
        }
        ZiExportInput::Multiple(datasets) => {
            let mut namer = ZiSheetNamer::new();
            datasets
                .iter()
                .map(|dataset| {
                    let name = namer.claim(&dataset.name);
                    dataset_sheet(name, dataset, dataset.columns_or(fallback), options, cancel)
                })
                .collect::<Result<Vec<_>>>()?
        }
    };
    Ok(ZiWorkbook { sheets })
}

fn dataset_sheet(
    name: String,
    dataset: &ZiDataset,
    columns: &[ZiColumnSpec],
    options: &ZiWorkbookOptions,
    cancel: &ZiCancelToken,
) -> Result<ZiSheet> {
    cancel.checkpoint(&format!("before dataset '{}'", dataset.name))?;

    let processing = dataset.options.as_ref().unwrap_or(&options.processing);
    let records: Vec<&Value> = if processing.is_noop() {
        dataset.data.iter().collect()
    } else {
        select_records(&dataset.data, processing)
    };

    let mut rows = options
        .template
        .as_ref()
        .map(|template| template.rows(&options.rows))
        .unwrap_or_default();
    let has_header = options.rows.include_headers
        && (!columns.is_empty() || records.first().is_some_and(|record| record.is_object()));
    let header_row = has_header.then_some(rows.len());
    rows.extend(to_rows(&records, columns, &options.rows));

    log::info!(
        "export.dataset.processed: sheet built - dataset={}, sheet={}, records={}, rows={}",
        dataset.name,
        name,
        records.len(),
        rows.len()
    );

    let sheet = build_sheet(name, rows, header_row, &options.sheet, &options.rows);
    cancel.checkpoint(&format!("after dataset '{}'", dataset.name))?;
    Ok(sheet)
}
