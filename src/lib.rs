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

//! # Zi Export Library
//!
//! This is the main library entry point for the Zi export engine. It takes
//! in-memory collections of heterogeneous JSON records, projects them onto a
//! declared column schema, filters, sorts and paginates them, and renders the
//! result as a structured JSON document or a spreadsheet workbook.
//!
//! ## Module Overview
//!
//! - **record**: datasets and export request shapes
//! - **schema**: column specs and the formatter registry
//! - **project**: dotted-path access and row projection
//! - **process**: filter, sort and pagination
//! - **validate**: input checks run before any transformation
//! - **export**: envelopes, JSON rendering, sheets, workbooks and backends
//! - **artifact**: the finished payload and its attributes
//! - **cancel**: cooperative cancellation tokens
//!
//! ## Quick Start
//!
//! ```rust
//! use zi_export::{export_structured, ZiCancelToken, ZiExportInput, ZiStructuredExportOptions};
//! use zi_export::schema::ZiColumnSpec;
//! use serde_json::json;
//!
//! let input = ZiExportInput::records(vec![
//!     json!({"id": 1, "customer": {"name": "Ada"}}),
//!     json!({"id": 2, "customer": {"name": "Lin"}}),
//! ]);
//! let options = ZiStructuredExportOptions::default()
//!     .with_columns(vec![ZiColumnSpec::field("id"), ZiColumnSpec::field("customer.name")]);
//!
//! let artifact = export_structured(&input, &options, &ZiCancelToken::new())?;
//! assert_eq!(artifact.suggested_filename, "export.json");
//! ```
//!
//! ## Architecture
//!
//! 1. **Validation**: reject null input and malformed schemas
//! 2. **Processing**: filter → project → sort → paginate per dataset
//! 3. **Rendering**: envelope + JSON text, or cells → sheets → workbook
//! 4. **Artifact**: payload bytes, filename, content type, resolved options
//!
//! ## Error Handling
//!
//! All operations return `Result<T, ZiError>`. Validation and cancellation
//! abort an export; formatter failures are logged and contained to one
//! value. No error path yields a partial artifact.

pub mod artifact;
pub mod cancel;
pub(crate) mod config;
pub mod errors;
pub mod export;
pub mod process;
pub mod project;
pub mod record;
pub mod schema;
pub mod validate;

pub use artifact::{ZiArtifact, ZiArtifactFormat};
pub use cancel::ZiCancelToken;
pub use errors::{Result, ZiError};
pub use record::{ZiDataset, ZiExportInput, ZiMetadata, ZiRecordBatch};
pub use validate::{validate, validate_dataset, validate_tabular, ZiValidationReport};

pub use export::{
    export_datasets, export_enveloped, export_multiple_sheets, export_projection,
    export_single_sheet, export_structured, export_tabular, export_with_template,
    ZiStructuredExportOptions, ZiTabularExportOptions,
};
