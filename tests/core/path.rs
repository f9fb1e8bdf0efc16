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
use zi_export::project::{get, set, ZiFieldPath};

#[test]
fn test_get_nested_field() {
    let record = json!({"customer": {"address": {"city": "Lyon"}}});
    assert_eq!(get(&record, "customer.address.city"), Some(&json!("Lyon")));
    assert_eq!(get(&record, "customer.address"), Some(&json!({"city": "Lyon"})));
}

#[test]
fn test_get_missing_segment_is_none() {
    let record = json!({"customer": {"name": "Ada"}});
    assert_eq!(get(&record, "customer.address.city"), None);
    assert_eq!(get(&record, "customer.name.first"), None);
    assert_eq!(get(&json!(null), "a"), None);
    assert_eq!(get(&json!(42), "a.b"), None);
}

#[test]
fn test_get_null_leaf_is_present() {
    let record = json!({"a": {"b": null}});
    assert_eq!(get(&record, "a.b"), Some(&json!(null)));
}

#[test]
fn test_get_array_index_segment() {
    let record = json!({"items": [{"sku": "x"}, {"sku": "y"}]});
    assert_eq!(get(&record, "items.0.sku"), Some(&json!("x")));
    assert_eq!(get(&record, "items.5.sku"), None);
    assert_eq!(get(&record, "items.first"), None);
}

#[test]
fn test_set_creates_intermediate_objects() {
    let mut record = json!({});
    set(&mut record, "a.b.c", json!(1));
    assert_eq!(record, json!({"a": {"b": {"c": 1}}}));
}

#[test]
fn test_set_replaces_scalar_intermediate() {
    let mut record = json!({"a": 5, "keep": true});
    set(&mut record, "a.b", json!("x"));
    assert_eq!(record, json!({"a": {"b": "x"}, "keep": true}));
}

#[test]
fn test_set_replaces_non_object_root() {
    let mut record = json!([1, 2]);
    set(&mut record, "a", json!(1));
    assert_eq!(record, json!({"a": 1}));
}

#[test]
fn test_set_preserves_siblings() {
    let mut record = json!({"a": {"x": 1}});
    set(&mut record, "a.y", json!(2));
    assert_eq!(record, json!({"a": {"x": 1, "y": 2}}));
}

#[test]
fn test_field_path_segments_are_verbatim() {
    let path = ZiFieldPath::parse(" a ..b");
    assert_eq!(path.segments(), &[" a ".to_string(), String::new(), "b".to_string()]);

    let mut record = json!({});
    path.set_value(&mut record, json!(true));
    assert_eq!(path.resolve(&record), Some(&json!(true)));
}
