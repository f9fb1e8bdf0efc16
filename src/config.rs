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

//! Shared readers for option factories.
//!
//! Missing or null keys fall back to the caller's default; a present key of
//! the wrong type is a validation error naming the owning option block.

use serde_json::{Map, Value};

use crate::errors::{Result, ZiError};

pub(crate) fn as_object<'a>(config: &'a Value, context: &str) -> Result<&'a Map<String, Value>> {
    config
        .as_object()
        .ok_or_else(|| ZiError::validation(format!("{} config must be object", context)))
}

pub(crate) fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|value| !value.is_null())
}

pub(crate) fn bool_or(obj: &Map<String, Value>, key: &str, default: bool, context: &str) -> Result<bool> {
    match present(obj, key) {
        None => Ok(default),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| ZiError::validation(format!("{} '{}' must be boolean", context, key))),
    }
}

pub(crate) fn string_opt(obj: &Map<String, Value>, key: &str, context: &str) -> Result<Option<String>> {
    match present(obj, key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ZiError::validation(format!("{} '{}' must be string", context, key))),
    }
}

pub(crate) fn string_or(obj: &Map<String, Value>, key: &str, default: &str, context: &str) -> Result<String> {
    Ok(string_opt(obj, key, context)?.unwrap_or_else(|| default.to_string()))
}

/// Reads an integer, clamping negatives to zero.
pub(crate) fn count_opt(obj: &Map<String, Value>, key: &str, context: &str) -> Result<Option<usize>> {
    match present(obj, key) {
        None => Ok(None),
        Some(value) => {
            if let Some(n) = value.as_u64() {
                return Ok(Some(usize::try_from(n).unwrap_or(usize::MAX)));
            }
            match value.as_i64() {
                Some(_) => Ok(Some(0)),
                None => Err(ZiError::validation(format!(
                    "{} '{}' must be integer",
                    context, key
                ))),
            }
        }
    }
}

pub(crate) fn metadata_opt(
    obj: &Map<String, Value>,
    key: &str,
    context: &str,
) -> Result<Option<Map<String, Value>>> {
    match present(obj, key) {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map.clone())),
        Some(_) => Err(ZiError::validation(format!("{} '{}' must be object", context, key))),
    }
}
