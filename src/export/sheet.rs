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

//! In-memory sheets and sheet naming rules.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::config;
use crate::errors::Result;
use crate::export::rows::{ZiCell, ZiRowOptions};

/// Longest sheet name accepted by spreadsheet formats.
pub const ZI_SHEET_NAME_MAX_LEN: usize = 31;

const ILLEGAL_SHEET_CHARS: [char; 7] = ['\\', '/', '?', '*', '[', ']', ':'];
const MIN_COLUMN_WIDTH: usize = 8;
const MAX_COLUMN_WIDTH: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ZiSheetOptions {
    pub auto_fit_columns: bool,
    pub freeze_top_row: bool,
}

impl Default for ZiSheetOptions {
    fn default() -> Self {
        Self {
            auto_fit_columns: true,
            freeze_top_row: true,
        }
    }
}

impl ZiSheetOptions {
    pub fn from_json(config: &Value) -> Result<Self> {
        let obj = config::as_object(config, "sheet")?;
        Ok(Self {
            auto_fit_columns: config::bool_or(obj, "auto_fit_columns", true, "sheet")?,
            freeze_top_row: config::bool_or(obj, "freeze_top_row", true, "sheet")?,
        })
    }
}

/// One tab of a workbook.
#[derive(Clone, Debug, PartialEq)]
pub struct ZiSheet {
    pub name: String,
    pub rows: Vec<Vec<ZiCell>>,
    /// Per-column widths in characters; empty when auto-fit is off.
    pub column_widths: Vec<f64>,
    /// Rows above the freeze line; 0 when nothing is frozen.
    pub frozen_rows: usize,
    /// Index of the header row, rendered bold by the backend.
    pub header_row: Option<usize>,
    pub number_format: Option<String>,
    pub date_format: String,
}

impl ZiSheet {
    /// Sheet with no rows.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            column_widths: Vec::new(),
            frozen_rows: 0,
            header_row: None,
            number_format: None,
            date_format: ZiRowOptions::default().date_format,
        }
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Wraps `rows` into a sheet.
///
/// `header_row` is the index of the header row, if one was written.
pub fn build_sheet(
    name: impl Into<String>,
    rows: Vec<Vec<ZiCell>>,
    header_row: Option<usize>,
    sheet_options: &ZiSheetOptions,
    row_options: &ZiRowOptions,
) -> ZiSheet {
    let column_widths = if sheet_options.auto_fit_columns {
        fit_column_widths(&rows)
    } else {
        Vec::new()
    };
    let frozen_rows = match header_row {
        Some(index) if sheet_options.freeze_top_row => index + 1,
        _ => 0,
    };

    ZiSheet {
        name: name.into(),
        rows,
        column_widths,
        frozen_rows,
        header_row,
        number_format: row_options.number_format.clone(),
        date_format: row_options.date_format.clone(),
    }
}

/// `clamp(longest cell text, 8, 50)` for every column.
pub fn fit_column_widths(rows: &[Vec<ZiCell>]) -> Vec<f64> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            widths[index] = widths[index].max(cell.display_text().chars().count());
        }
    }
    widths
        .into_iter()
        .map(|width| width.clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH) as f64)
        .collect()
}

/// Strips `\ / ? * [ ] :`, trims whitespace and apostrophes and truncates to
/// 31 characters. An empty result becomes `Sheet`.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name.chars().filter(|c| !ILLEGAL_SHEET_CHARS.contains(c)).collect();
    let trimmed = cleaned.trim().trim_matches('\'').trim();
    let base = if trimmed.is_empty() { "Sheet" } else { trimmed };
    base.chars().take(ZI_SHEET_NAME_MAX_LEN).collect::<String>().trim_end().to_string()
}

/// Hands out sheet names that are unique ignoring case.
#[derive(Debug, Default)]
pub struct ZiSheetNamer {
    taken: HashSet<String>,
}

impl ZiSheetNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitizes `name` and appends `__N` until it is unused.
    pub fn claim(&mut self, name: &str) -> String {
        let name = sanitize_sheet_name(name);
        if self.taken.insert(name.to_lowercase()) {
            return name;
        }

        let mut index = 2usize;
        loop {
            // The suffix must survive truncation, so the base shrinks as it grows.
            let suffix = format!("__{}", index);
            let base: String = name
                .chars()
                .take(ZI_SHEET_NAME_MAX_LEN.saturating_sub(suffix.chars().count()))
                .collect();
            let candidate = format!("{}{}", base.trim_end(), suffix);
            if self.taken.insert(candidate.to_lowercase()) {
                return candidate;
            }
            index += 1;
        }
    }
}
