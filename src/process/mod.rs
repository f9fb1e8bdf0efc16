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

//! # Dataset Processing Module
//!
//! Filtering, sorting and pagination of a dataset. The order is fixed:
//! filter → project → sort → paginate.
//!
//! - **filter**: declarative [`ZiFilterRule`]s, `all`/`any` combinators and
//!   caller predicates
//! - **sort**: field, comparator and multi-key sorts
//! - **processor**: [`process`] and [`select_records`]

pub mod filter;
pub mod processor;
pub mod sort;

pub use filter::{ZiFilter, ZiFilterRule, ZiPredicate};
pub use processor::{process, select_records, ZiProcessingOptions};
pub use sort::{compare_values, ZiComparator, ZiSort, ZiSortKey, ZiSortOrder};
