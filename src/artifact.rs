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

//! The finished export: payload bytes plus the attributes a delivery layer
//! needs to name, label and audit it.

use serde::Serialize;
use serde_json::Value;

/// Payload family of an artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZiArtifactFormat {
    Json,
    Tabular,
}

/// Immutable result of a successful export.
#[derive(Clone, Debug, Serialize)]
pub struct ZiArtifact {
    #[serde(skip)]
    pub payload: Vec<u8>,
    pub suggested_filename: String,
    pub format: ZiArtifactFormat,
    pub content_type: String,
    /// Resolved options the export ran with.
    pub options: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_count: Option<usize>,
    /// BLAKE3 hex digest of `payload`.
    pub checksum: String,
}

impl ZiArtifact {
    pub fn new(
        payload: Vec<u8>,
        suggested_filename: String,
        format: ZiArtifactFormat,
        content_type: impl Into<String>,
        options: Value,
    ) -> Self {
        let checksum = blake3::hash(&payload).to_hex().to_string();
        Self {
            payload,
            suggested_filename,
            format,
            content_type: content_type.into(),
            options,
            sheet_count: None,
            checksum,
        }
    }

    pub fn with_sheet_count(mut self, sheet_count: usize) -> Self {
        self.sheet_count = Some(sheet_count);
        self
    }

    /// Payload as UTF-8 text, if it is text.
    pub fn payload_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Appends `.ext` unless `filename` already ends with it (case-insensitive).
pub fn ensure_extension(filename: &str, ext: &str) -> String {
    let suffix = format!(".{}", ext);
    if filename.to_ascii_lowercase().ends_with(&suffix.to_ascii_lowercase()) {
        filename.to_string()
    } else {
        format!("{}{}", filename, suffix)
    }
}
