//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd Team.
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

//! # Data Export Module
//!
//! This module renders processed datasets into artifacts.
//!
//! ## Module Components
//!
//! - **Envelope** ([envelope.rs](envelope/index.html)): simple, envelope and structured shapes
//! - **Structured** ([structured.rs](structured/index.html)): JSON export entry points
//! - **Optimizer** ([optimizer.rs](optimizer/index.html)): optional size pass over JSON content
//! - **Rows** ([rows.rs](rows/index.html)): records to typed cells
//! - **Sheet** ([sheet.rs](sheet/index.html)): sheets, widths and sheet names
//! - **Workbook** ([workbook.rs](workbook/index.html)): one sheet per dataset, templates
//! - **Backend** ([backend.rs](backend/index.html)): XLSX and CSV writers, lazy providers
//! - **Tabular** ([tabular.rs](tabular/index.html)): spreadsheet export entry points
//!
//! ## Usage Patterns
//!
//! ### Structured Export
//!
//! ```rust
//! use zi_export::export::{export_structured, ZiStructuredExportOptions};
//! use zi_export::{ZiCancelToken, ZiExportInput};
//! use serde_json::json;
//!
//! let input = ZiExportInput::records(vec![json!({"id": 1})]);
//! let artifact = export_structured(&input, &ZiStructuredExportOptions::default(), &ZiCancelToken::new())?;
//! ```
//!
//! ### Tabular Export
//!
//! ```rust
//! use zi_export::export::{export_tabular, ZiLazyBackendProvider, ZiTabularExportOptions};
//!
//! let provider = ZiLazyBackendProvider::default();
//! let artifact = export_tabular(&input, &ZiTabularExportOptions::default(), &provider, &cancel).await?;
//! ```

pub mod backend;
pub mod envelope;
pub mod optimizer;
pub mod rows;
pub mod sheet;
pub mod structured;
pub mod tabular;
pub mod workbook;

pub use backend::{
    ZiBackendProvider, ZiBookType, ZiCsvBackend, ZiDefaultBackend, ZiLazyBackendProvider,
    ZiSpreadsheetBackend, ZiWriteOptions, ZiXlsxBackend,
};
pub use envelope::{build_envelope, ZiEnvelopeFormat, ZiEnvelopeOptions};
pub use optimizer::{optimize, ZiOptimizeOptions};
pub use rows::{to_rows, ZiCell, ZiRowOptions};
pub use sheet::{build_sheet, sanitize_sheet_name, ZiSheet, ZiSheetNamer, ZiSheetOptions};
pub use structured::{
    export_datasets, export_enveloped, export_projection, export_structured, export_structured_json,
    serialize_json, ZiStructuredExportOptions,
};
pub use tabular::{
    export_multiple_sheets, export_single_sheet, export_tabular, export_tabular_json,
    export_with_template, ZiTabularExportOptions,
};
pub use workbook::{assemble_workbook, ZiTemplate, ZiWorkbook, ZiWorkbookOptions};
