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

//! # Column Schema Module
//!
//! Column schemas declare which fields of a record are exported and how.
//!
//! - **column**: [`ZiColumnSpec`], a bare field name or a
//!   [`ZiColumnDescriptor`] with output path, formatter, default, nested
//!   schema and header label
//! - **formatter**: named formatter functions and the
//!   [`ZiFormatterRegistry`] that resolves them from JSON configuration
//!
//! ```rust
//! use zi_export::schema::{ZiColumnDescriptor, ZiColumnSpec, ZiFormatterRegistry};
//! use serde_json::json;
//!
//! let registry = ZiFormatterRegistry::with_builtins();
//! let columns = ZiColumnSpec::list_from_json(
//!     &json!(["id", {"key": "customer.name", "output_key": "name", "formatter": "string.upper"}]),
//!     &registry,
//! )?;
//! ```

pub mod column;
pub mod formatter;

pub use column::{ZiColumnDescriptor, ZiColumnSpec, ZiDefaultValue};
pub use formatter::{ZiFormatter, ZiFormatterRegistry, ZiRowFunction};
