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

use crate::config;
use crate::errors::Result;
use crate::process::filter::ZiFilter;
use crate::process::sort::ZiSort;
use crate::project::{project, ZiProjectionOptions};
use crate::schema::ZiColumnSpec;

/// Filter, sort and pagination applied to one dataset.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ZiProcessingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<ZiFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<ZiSort>,
    /// Maximum number of rows; `None` is unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    pub offset: usize,
}

impl ZiProcessingOptions {
    pub fn with_filter(mut self, filter: ZiFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_sort(mut self, sort: ZiSort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn is_noop(&self) -> bool {
        self.filter.is_none() && self.sort.is_none() && self.limit.is_none() && self.offset == 0
    }

    /// Reads `filter`, `sort`, `limit` and `offset`; negative counts clamp to zero.
    pub fn from_json(config: &Value) -> Result<Self> {
        let obj = config::as_object(config, "processing")?;
        Ok(Self {
            filter: config::present(obj, "filter").map(ZiFilter::from_json).transpose()?,
            sort: config::present(obj, "sort").map(ZiSort::from_json).transpose()?,
            limit: config::count_opt(obj, "limit", "processing")?,
            offset: config::count_opt(obj, "offset", "processing")?.unwrap_or(0),
        })
    }

    fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

/// Runs filter → project → sort → paginate.
///
/// Filter and sort read the original record, so sort keys need not survive
/// projection. Caller records are never mutated.
pub fn process(
    data: &[Value],
    columns: &[ZiColumnSpec],
    processing: &ZiProcessingOptions,
    projection: &ZiProjectionOptions,
) -> Vec<Value> {
    let mut rows: Vec<(&Value, Value)> = data
        .iter()
        .filter(|record| keep(processing, record))
        .map(|record| (record, project(record, columns, projection)))
        .collect();

    if let Some(sort) = &processing.sort {
        sort.apply(&mut rows, |row| row.0);
    }

    processing
        .paginate(rows)
        .into_iter()
        .map(|(_, projected)| projected)
        .collect()
}

/// Runs filter → sort → paginate without projecting.
///
/// Used by the tabular path, which converts original records to cells itself.
pub fn select_records<'a>(data: &'a [Value], processing: &ZiProcessingOptions) -> Vec<&'a Value> {
    let mut records: Vec<&Value> = data.iter().filter(|record| keep(processing, record)).collect();
    if let Some(sort) = &processing.sort {
        sort.apply(&mut records, |record| *record);
    }
    processing.paginate(records)
}

fn keep(processing: &ZiProcessingOptions, record: &Value) -> bool {
    processing
        .filter
        .as_ref()
        .map_or(true, |filter| filter.matches(record))
}
