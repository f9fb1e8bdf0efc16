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

use serde_json::json;
use zi_export::export::{optimize, ZiOptimizeOptions};

#[test]
fn test_default_options_change_nothing() {
    let value = json!({"a": null, "b": "", "c": [], "d": {}, "e": 1.123456789});
    assert_eq!(optimize(&value, &ZiOptimizeOptions::default()), value);
}

#[test]
fn test_remove_null_only() {
    let options = ZiOptimizeOptions {
        remove_null: true,
        ..Default::default()
    };
    let value = json!({"a": null, "b": [null, 1], "c": ""});
    assert_eq!(optimize(&value, &options), json!({"b": [1], "c": ""}));
}

#[test]
fn test_empty_containers_kept_without_flags() {
    let options = ZiOptimizeOptions {
        remove_null: true,
        ..Default::default()
    };
    assert_eq!(optimize(&json!({"a": {"b": null}}), &options), json!({"a": {}}));
}

#[test]
fn test_cascading_removal() {
    let options = ZiOptimizeOptions {
        remove_null: true,
        remove_empty_strings: true,
        remove_empty_arrays: true,
        remove_empty_objects: true,
        ..Default::default()
    };
    let value = json!([{"tags": ["", null], "meta": {"x": null}}, {"id": 1}]);
    assert_eq!(optimize(&value, &options), json!([{"id": 1}]));
}

#[test]
fn test_compact_numbers_leaves_integers() {
    let options = ZiOptimizeOptions {
        compact_numbers: true,
        number_precision: 3,
        ..Default::default()
    };
    let value = json!({"i": 12345678901i64, "f": 2.71828, "big": 1.5e20});
    assert_eq!(optimize(&value, &options), json!({"i": 12345678901i64, "f": 2.718, "big": 1.5e20}));
}

#[test]
fn test_scalar_root_is_kept() {
    let options = ZiOptimizeOptions::aggressive();
    assert_eq!(optimize(&json!(null), &options), json!(null));
    assert_eq!(optimize(&json!(""), &options), json!(null));
    assert_eq!(optimize(&json!({"a": null}), &options), json!({}));
}

#[test]
fn test_optimize_is_idempotent_on_sample() {
    let options = ZiOptimizeOptions::aggressive();
    let value = json!({"a": [{"b": [null, ""]}, 0.1234567], "c": {"d": {}}});
    let once = optimize(&value, &options);
    assert_eq!(once, json!({"a": [0.123457]}));
    assert_eq!(optimize(&once, &options), once);
}

#[test]
fn test_options_from_json() {
    let options = ZiOptimizeOptions::from_json(&json!({"remove_null": true, "number_precision": 2})).unwrap();
    assert!(options.remove_null);
    assert!(!options.compact_numbers);
    assert_eq!(options.number_precision, 2);

    assert!(ZiOptimizeOptions::from_json(&json!({"number_precision": 16})).is_err());
    assert!(ZiOptimizeOptions::from_json(&json!({"remove_null": "yes"})).is_err());
    assert!(ZiOptimizeOptions::from_json(&json!([])).is_err());
}
