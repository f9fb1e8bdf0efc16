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

//! # Zi Export Error Module
//!
//! This module defines the error types used throughout the export engine.
//!
//! ## Error Categories
//!
//! - **Validation**: input, schema or configuration rejected before any
//!   transformation begins
//! - **Formatter**: a column formatter failed; the projector contains these
//!   locally and keeps the unformatted value
//! - **Cancelled**: a cancellation token was observed at a checkpoint
//! - **Serialization**: the final JSON or spreadsheet rendering failed
//!
//! Validation and cancellation abort the whole export. Formatter failures
//! never do. No error path produces a partial artifact.
//!
//! ## Usage
//!
//! ```rust
//! use zi_export::errors::{Result, ZiError};
//!
//! fn check(limit: i64) -> Result<usize> {
//!     if limit < 0 {
//!         return Err(ZiError::validation("limit must be >= 0"));
//!     }
//!     Ok(limit as usize)
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zip::result::ZipError;

/// Convenience result type used throughout the export engine.
pub type Result<T> = std::result::Result<T, ZiError>;

/// Canonical error enumeration for the export engine.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ZiError {
    /// Input, column schema or options rejected before processing.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A named column formatter failed on one value.
    #[error("formatter '{formatter}' failed: {message}")]
    Formatter { formatter: String, message: String },

    /// The caller's cancellation token was set when a checkpoint was reached.
    #[error("export was cancelled at checkpoint '{checkpoint}'")]
    Cancelled { checkpoint: String },

    /// Failure while rendering the final text or binary payload.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<io::Error> for ZiError {
    fn from(err: io::Error) -> Self {
        ZiError::Serialization(format!("io: {}", err))
    }
}

impl From<serde_json::Error> for ZiError {
    fn from(err: serde_json::Error) -> Self {
        ZiError::Serialization(format!("json: {}", err))
    }
}

impl From<rust_xlsxwriter::XlsxError> for ZiError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ZiError::Serialization(format!("xlsx write error: {}", err))
    }
}

impl From<csv::Error> for ZiError {
    fn from(err: csv::Error) -> Self {
        ZiError::Serialization(format!("csv: {}", err))
    }
}

impl From<ZipError> for ZiError {
    fn from(err: ZipError) -> Self {
        ZiError::Serialization(format!("zip: {}", err))
    }
}

impl ZiError {
    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        ZiError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct formatter errors.
    pub fn formatter(name: impl Into<String>, message: impl Into<String>) -> Self {
        ZiError::Formatter {
            formatter: name.into(),
            message: message.into(),
        }
    }

    /// Helper to construct cancellation errors.
    pub fn cancelled(checkpoint: impl Into<String>) -> Self {
        ZiError::Cancelled {
            checkpoint: checkpoint.into(),
        }
    }

    /// Helper to construct serialization errors.
    pub fn serialization<T: Into<String>>(message: T) -> Self {
        ZiError::Serialization(message.into())
    }

    /// True when the error is a cancellation rather than a processing failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ZiError::Cancelled { .. })
    }
}
