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

use serde_json::{json, Value};
use zi_export::export::structured::{JSON_CONTENT_TYPE, MAX_INDENT};
use zi_export::export::{export_structured_json, ZiEnvelopeFormat, ZiOptimizeOptions};
use zi_export::process::{ZiProcessingOptions, ZiSort};
use zi_export::schema::{ZiColumnDescriptor, ZiColumnSpec, ZiFormatter, ZiFormatterRegistry};
use zi_export::{
    export_datasets, export_enveloped, export_projection, export_structured, ZiArtifactFormat,
    ZiCancelToken, ZiDataset, ZiError, ZiExportInput, ZiStructuredExportOptions,
};

fn parse(payload: &[u8]) -> Value {
    serde_json::from_slice(payload).unwrap()
}

#[test]
fn test_simple_format_is_bare_list() {
    let input = ZiExportInput::records(vec![json!({"x": 1})]);
    let options = ZiStructuredExportOptions::default().with_format(ZiEnvelopeFormat::Simple);
    let artifact = export_structured(&input, &options, &ZiCancelToken::new()).unwrap();
    assert_eq!(parse(&artifact.payload), json!([{"x": 1}]));
    assert_eq!(artifact.format, ZiArtifactFormat::Json);
    assert_eq!(artifact.content_type, JSON_CONTENT_TYPE);
    assert_eq!(artifact.suggested_filename, "export.json");
}

#[test]
fn test_structured_format_reports_record_count() {
    let input = ZiExportInput::records(vec![json!({"id": 1, "name": "Ada"})]);
    let options = ZiStructuredExportOptions::default().with_columns(vec![ZiColumnSpec::field("name")]);
    let artifact = export_structured(&input, &options, &ZiCancelToken::new()).unwrap();
    let document = parse(&artifact.payload);
    assert_eq!(document["data"], json!([{"name": "Ada"}]));
    assert_eq!(document["metadata"]["recordCount"], json!(1));
    assert_eq!(document["metadata"]["exportFormat"], json!("json"));
    assert_eq!(document["metadata"]["timezone"], json!("UTC"));
    assert!(document["metadata"]["exportedAt"].is_string());
}

#[test]
fn test_enveloped_shape() {
    let input = ZiExportInput::records(vec![json!({"a": 1}), json!({"a": 2})]);
    let mut options = ZiStructuredExportOptions::default();
    options.metadata.insert("source".to_string(), json!("crm"));
    options.envelope.include_timestamp = false;
    let artifact = export_enveloped(&input, &options, &ZiCancelToken::new()).unwrap();
    assert_eq!(
        parse(&artifact.payload),
        json!({"success": true, "data": [{"a": 1}, {"a": 2}], "metadata": {"source": "crm"}})
    );
}

#[test]
fn test_projection_export_applies_processing() {
    let input = ZiExportInput::records(vec![json!({"n": 3}), json!({"n": 1}), json!({"n": 2})]);
    let options = ZiStructuredExportOptions {
        processing: ZiProcessingOptions::default()
            .with_sort(ZiSort::Field("n".to_string()))
            .with_limit(2),
        ..Default::default()
    };
    let artifact = export_projection(&input, &options, &ZiCancelToken::new()).unwrap();
    assert_eq!(parse(&artifact.payload), json!([{"n": 1}, {"n": 2}]));
}

#[test]
fn test_multiple_datasets_metadata() {
    let datasets = vec![
        ZiDataset::new("orders", vec![json!({"id": 1, "total": 9.5}), json!({"id": 2, "total": 3.0})])
            .with_columns(vec![ZiColumnSpec::field("id")]),
        ZiDataset::new("customers", vec![json!({"name": "Ada"})]),
        ZiDataset::new("orders", vec![]),
    ];
    let options = ZiStructuredExportOptions::default();
    let artifact = export_datasets(datasets, &options, &ZiCancelToken::new()).unwrap();
    let document = parse(&artifact.payload);

    assert_eq!(
        document["datasets"],
        json!({
            "orders": [{"id": 1}, {"id": 2}],
            "customers": [{"name": "Ada"}],
            "orders__2": []
        })
    );
    let metadata = &document["metadata"];
    assert_eq!(metadata["datasetsCount"], json!(3));
    assert_eq!(metadata["totalRecords"], json!(3));
    assert_eq!(metadata["recordCount"], json!(1));
    assert_eq!(
        metadata["datasets"],
        json!([
            {"name": "orders", "recordCount": 2, "columns": ["id"]},
            {"name": "customers", "recordCount": 1, "columns": ["name"]},
            {"name": "orders__2", "recordCount": 0, "columns": []}
        ])
    );
}

#[test]
fn test_branding_lands_in_metadata() {
    let input = ZiExportInput::records(vec![json!({"a": 1})]);
    let mut branding = serde_json::Map::new();
    branding.insert("company".to_string(), json!("Dunimd"));
    let options = ZiStructuredExportOptions {
        branding: Some(branding),
        ..Default::default()
    };
    let artifact = export_structured(&input, &options, &ZiCancelToken::new()).unwrap();
    assert_eq!(parse(&artifact.payload)["metadata"]["branding"], json!({"company": "Dunimd"}));
}

#[test]
fn test_optimizer_runs_on_content() {
    let input = ZiExportInput::records(vec![json!({"a": null, "b": "", "c": 1.23456})]);
    let options = ZiStructuredExportOptions {
        optimize: Some(ZiOptimizeOptions {
            number_precision: 2,
            ..ZiOptimizeOptions::aggressive()
        }),
        ..Default::default()
    }
    .with_format(ZiEnvelopeFormat::Simple);
    let artifact = export_structured(&input, &options, &ZiCancelToken::new()).unwrap();
    assert_eq!(parse(&artifact.payload), json!([{"c": 1.23}]));
}

#[test]
fn test_compact_rendering_with_zero_indent() {
    let input = ZiExportInput::records(vec![json!({"a": 1})]);
    let options = ZiStructuredExportOptions {
        indent: 0,
        ..Default::default()
    }
    .with_format(ZiEnvelopeFormat::Simple);
    let artifact = export_structured(&input, &options, &ZiCancelToken::new()).unwrap();
    assert_eq!(artifact.payload_text(), Some(r#"[{"a":1}]"#));
}

#[test]
fn test_filename_gets_json_extension() {
    let input = ZiExportInput::records(vec![json!({"a": 1})]);
    let options = ZiStructuredExportOptions {
        filename: "report".to_string(),
        ..Default::default()
    };
    let artifact = export_structured(&input, &options, &ZiCancelToken::new()).unwrap();
    assert_eq!(artifact.suggested_filename, "report.json");

    let options = ZiStructuredExportOptions {
        filename: "Report.JSON".to_string(),
        ..Default::default()
    };
    let artifact = export_structured(&input, &options, &ZiCancelToken::new()).unwrap();
    assert_eq!(artifact.suggested_filename, "Report.JSON");
}

#[test]
fn test_artifact_records_resolved_options_and_checksum() {
    let input = ZiExportInput::records(vec![json!({"a": 1})]);
    let options = ZiStructuredExportOptions::default().with_columns(vec![ZiColumnSpec::field("a")]);
    let artifact = export_structured(&input, &options, &ZiCancelToken::new()).unwrap();
    assert_eq!(artifact.options["columns"], json!(["a"]));
    assert_eq!(artifact.options["indent"], json!(2));
    assert_eq!(artifact.checksum, blake3::hash(&artifact.payload).to_hex().to_string());
}

#[test]
fn test_pre_cancelled_token_aborts() {
    let input = ZiExportInput::records(vec![json!({"a": 1})]);
    let err = export_structured(&input, &ZiStructuredExportOptions::default(), &ZiCancelToken::cancelled())
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn test_cancel_between_datasets_aborts() {
    let cancel = ZiCancelToken::new();
    let trigger = cancel.clone();
    let cancelling = ZiFormatter::new("cancelling", move |value, _| {
        trigger.cancel();
        Ok(value.clone())
    });
    let datasets = vec![
        ZiDataset::new("first", vec![json!({"a": 1})])
            .with_columns(vec![ZiColumnDescriptor::new("a").with_formatter(cancelling).into()]),
        ZiDataset::new("second", vec![json!({"a": 2})]),
    ];
    let err = export_datasets(datasets, &ZiStructuredExportOptions::default(), &cancel).unwrap_err();
    assert!(err.is_cancelled());
    assert!(err.to_string().contains("first"));
}

#[test]
fn test_validation_rejects_keyless_column() {
    let input = ZiExportInput::records(vec![json!({"a": 1})]);
    let options = ZiStructuredExportOptions::default().with_columns(vec![ZiColumnSpec::field("")]);
    let err = export_structured(&input, &options, &ZiCancelToken::new()).unwrap_err();
    assert!(!err.is_cancelled());
    assert!(err.to_string().contains("lacks a resolvable key"));
}

#[test]
fn test_export_from_json_configuration() {
    let registry = ZiFormatterRegistry::with_builtins();
    let artifact = export_structured_json(
        &json!({"data": [{"name": " ada "}, {"name": "lin"}], "columns": [{"key": "name", "formatter": "string.trim"}]}),
        &json!({
            "format": "envelope",
            "data_key": "rows",
            "include_metadata": false,
            "filename": "people",
            "sort": {"field": "name", "order": "desc"}
        }),
        &registry,
        &ZiCancelToken::new(),
    )
    .unwrap();
    assert_eq!(artifact.suggested_filename, "people.json");
    assert_eq!(
        parse(&artifact.payload),
        json!({"success": true, "rows": [{"name": "lin"}, {"name": "ada"}]})
    );
}

#[test]
fn test_export_from_json_rejects_null_input() {
    let registry = ZiFormatterRegistry::new();
    let err = export_structured_json(&json!(null), &json!({}), &registry, &ZiCancelToken::new()).unwrap_err();
    assert!(err.to_string().contains("null"));
}

#[test]
fn test_huge_indent_is_a_validation_error() {
    let input = ZiExportInput::records(vec![json!({"a": 1})]);
    let options = ZiStructuredExportOptions {
        indent: usize::MAX,
        ..Default::default()
    };
    let err = export_structured(&input, &options, &ZiCancelToken::new()).unwrap_err();
    assert!(matches!(err, ZiError::Validation { .. }));

    let registry = ZiFormatterRegistry::new();
    let err = export_structured_json(
        &json!([{"a": 1}]),
        &json!({"indent": 18446744073709551615u64}),
        &registry,
        &ZiCancelToken::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ZiError::Validation { .. }));

    let options = ZiStructuredExportOptions {
        indent: MAX_INDENT,
        ..Default::default()
    };
    assert!(export_structured(&input, &options, &ZiCancelToken::new()).is_ok());
}
