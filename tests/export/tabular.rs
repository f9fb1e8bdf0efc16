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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use zi_export::export::backend::{CSV_CONTENT_TYPE, XLSX_CONTENT_TYPE, ZIP_CONTENT_TYPE};
use zi_export::export::sheet::ZI_SHEET_NAME_MAX_LEN;
use zi_export::export::{
    assemble_workbook, export_tabular_json, ZiBookType, ZiCell, ZiLazyBackendProvider, ZiSpreadsheetBackend,
    ZiTemplate, ZiWorkbook, ZiWorkbookOptions, ZiWriteOptions,
};
use zi_export::process::{ZiProcessingOptions, ZiSort};
use zi_export::schema::{ZiColumnDescriptor, ZiColumnSpec, ZiFormatterRegistry};
use zi_export::{
    export_multiple_sheets, export_single_sheet, export_tabular, export_with_template, Result, ZiArtifactFormat,
    ZiCancelToken, ZiDataset, ZiError, ZiExportInput, ZiTabularExportOptions,
};

fn csv_options() -> ZiTabularExportOptions {
    ZiTabularExportOptions::default().with_book_type(ZiBookType::Csv)
}

fn csv_text(payload: &[u8]) -> String {
    String::from_utf8(payload.to_vec()).unwrap()
}

/// Returns a fixed payload and counts how often it was asked to write.
#[derive(Default)]
struct CountingBackend {
    writes: AtomicUsize,
}

impl ZiSpreadsheetBackend for CountingBackend {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn write(&self, workbook: &ZiWorkbook, _options: &ZiWriteOptions) -> Result<Vec<u8>> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(format!("sheets={}", workbook.sheet_count()).into_bytes())
    }
}

#[tokio::test]
async fn test_xlsx_single_sheet() {
    let input = ZiExportInput::records(vec![json!({"id": 1, "name": "Ada"}), json!({"id": 2, "name": "Lin"})]);
    let provider = ZiLazyBackendProvider::default();
    let artifact = export_tabular(&input, &ZiTabularExportOptions::default(), &provider, &ZiCancelToken::new())
        .await
        .unwrap();

    assert_eq!(&artifact.payload[..2], b"PK");
    assert_eq!(artifact.format, ZiArtifactFormat::Tabular);
    assert_eq!(artifact.content_type, XLSX_CONTENT_TYPE);
    assert_eq!(artifact.suggested_filename, "export.xlsx");
    assert_eq!(artifact.sheet_count, Some(1));
}

#[tokio::test]
async fn test_csv_with_columns() {
    let dataset = ZiDataset::new(
        "people",
        vec![json!({"id": 1, "person": {"name": "Ada"}}), json!({"id": 2, "person": {"name": "Lin, Jr"}})],
    );
    let columns: Vec<ZiColumnSpec> = vec![
        ZiColumnDescriptor::new("id").with_header("ID").into(),
        ZiColumnDescriptor::new("person.name").with_header("Name").into(),
        ZiColumnDescriptor::new("active").with_default(json!(true)).into(),
    ];
    let options = csv_options().with_columns(columns);
    let artifact = export_single_sheet(dataset, &options, &ZiLazyBackendProvider::default(), &ZiCancelToken::new())
        .await
        .unwrap();

    assert_eq!(artifact.content_type, CSV_CONTENT_TYPE);
    assert_eq!(artifact.suggested_filename, "export.csv");
    assert_eq!(csv_text(&artifact.payload), "ID,Name,active\n1,Ada,true\n2,\"Lin, Jr\",true\n");
}

#[tokio::test]
async fn test_csv_without_schema_uses_first_record_keys() {
    let input = ZiExportInput::records(vec![json!({"a": 1, "b": "x"}), json!({"a": 2, "b": null})]);
    let artifact = export_tabular(&input, &csv_options(), &ZiLazyBackendProvider::default(), &ZiCancelToken::new())
        .await
        .unwrap();
    assert_eq!(csv_text(&artifact.payload), "a,b\n1,x\n2,\n");
}

#[tokio::test]
async fn test_csv_placeholders_and_headers_off() {
    let input = ZiExportInput::records(vec![json!({"a": null})]);
    let mut options = csv_options().with_columns(vec![ZiColumnSpec::field("a"), ZiColumnSpec::field("b")]);
    options.workbook.rows.include_headers = false;
    options.workbook.rows.null_value = "NULL".to_string();
    options.workbook.rows.undefined_value = "-".to_string();
    let artifact = export_tabular(&input, &options, &ZiLazyBackendProvider::default(), &ZiCancelToken::new())
        .await
        .unwrap();
    assert_eq!(csv_text(&artifact.payload), "NULL,-\n");
}

#[tokio::test]
async fn test_processing_applies_per_sheet() {
    let input = ZiExportInput::records(vec![json!({"n": 3}), json!({"n": 1}), json!({"n": 2})]);
    let mut options = csv_options();
    options.workbook.processing = ZiProcessingOptions::default()
        .with_sort(ZiSort::Field("n".to_string()))
        .with_offset(1);
    let artifact = export_tabular(&input, &options, &ZiLazyBackendProvider::default(), &ZiCancelToken::new())
        .await
        .unwrap();
    assert_eq!(csv_text(&artifact.payload), "n\n2\n3\n");
}

#[tokio::test]
async fn test_multiple_sheets_csv_is_zipped() {
    let datasets = vec![
        ZiDataset::new("Orders", vec![json!({"id": 1})]),
        ZiDataset::new("Customers", vec![json!({"name": "Ada"})]),
    ];
    let artifact = export_multiple_sheets(datasets, &csv_options(), &ZiLazyBackendProvider::default(), &ZiCancelToken::new())
        .await
        .unwrap();
    assert_eq!(artifact.sheet_count, Some(2));
    assert_eq!(artifact.content_type, ZIP_CONTENT_TYPE);
    assert_eq!(artifact.suggested_filename, "export.zip");
    assert_eq!(&artifact.payload[..2], b"PK");
}

#[tokio::test]
async fn test_empty_dataset_list_yields_one_sheet() {
    let registry = ZiFormatterRegistry::new();
    let artifact = export_tabular_json(
        &json!({"datasets": []}),
        &json!({}),
        &registry,
        &ZiLazyBackendProvider::default(),
        &ZiCancelToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(artifact.sheet_count, Some(1));
    assert_eq!(&artifact.payload[..2], b"PK");
}

#[test]
fn test_sheet_names_are_sanitized_and_unique() {
    let input = ZiExportInput::Multiple(vec![
        ZiDataset::new("Q1/Q2*Report[final]", vec![json!({"a": 1})]),
        ZiDataset::new("q1q2reportfinal", vec![json!({"a": 2})]),
        ZiDataset::new("A very long dataset name that keeps going", vec![]),
    ]);
    let workbook =
        assemble_workbook(&input, None, &ZiWorkbookOptions::default(), &ZiCancelToken::new()).unwrap();
    let names: Vec<&str> = workbook.sheets.iter().map(|sheet| sheet.name.as_str()).collect();

    assert_eq!(names[0], "Q1Q2Reportfinal");
    assert_eq!(names[1], "q1q2reportfinal__2");
    for name in &names {
        assert!(!name.contains(|c: char| matches!(c, '/' | '*' | '[' | ']')));
        assert!(name.chars().count() <= ZI_SHEET_NAME_MAX_LEN);
    }
}

#[test]
fn test_header_row_is_frozen_and_widths_fit() {
    let input = ZiExportInput::records(vec![json!({"description": "x".repeat(80), "n": 1})]);
    let workbook =
        assemble_workbook(&input, None, &ZiWorkbookOptions::default(), &ZiCancelToken::new()).unwrap();
    let sheet = &workbook.sheets[0];
    assert_eq!(sheet.name, "Sheet1");
    assert_eq!(sheet.header_row, Some(0));
    assert_eq!(sheet.frozen_rows, 1);
    assert_eq!(sheet.column_widths, vec![50.0, 8.0]);
}

#[tokio::test]
async fn test_template_rows_precede_grid() {
    let input = ZiExportInput::records(vec![json!({"id": 1})]);
    let template = ZiTemplate::titled("Quarterly").with_subtitle("Q3");
    let artifact = export_with_template(
        &input,
        template,
        &csv_options(),
        &ZiLazyBackendProvider::default(),
        &ZiCancelToken::new(),
    )
    .await
    .unwrap();
    let text = csv_text(&artifact.payload);
    assert!(text.starts_with("Quarterly\nQ3\n"));
    assert!(text.ends_with("id\n1\n"));
}

#[test]
fn test_template_summary_rows() {
    let options = ZiWorkbookOptions {
        template: Some(ZiTemplate::default().with_summary("Total", json!(42))),
        ..Default::default()
    };
    let input = ZiExportInput::records(vec![json!({"id": 1})]);
    let workbook = assemble_workbook(&input, None, &options, &ZiCancelToken::new()).unwrap();
    let sheet = &workbook.sheets[0];
    assert_eq!(sheet.rows[0], vec![ZiCell::text("Total"), ZiCell::Number(42.0)]);
    assert_eq!(sheet.header_row, Some(2));
}

#[tokio::test]
async fn test_cancelled_before_backend_load() {
    let input = ZiExportInput::records(vec![json!({"a": 1})]);
    let provider = ZiLazyBackendProvider::default();
    let err = export_tabular(&input, &ZiTabularExportOptions::default(), &provider, &ZiCancelToken::cancelled())
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(!provider.is_loaded());
}

#[tokio::test]
async fn test_lazy_provider_loads_once() {
    let inits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&inits);
    let provider = ZiLazyBackendProvider::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(CountingBackend::default()) as Arc<dyn ZiSpreadsheetBackend>)
    });
    assert!(!provider.is_loaded());

    let input = ZiExportInput::records(vec![json!({"a": 1})]);
    let options = ZiTabularExportOptions::default();
    for _ in 0..3 {
        let artifact = export_tabular(&input, &options, &provider, &ZiCancelToken::new()).await.unwrap();
        assert_eq!(artifact.payload, b"sheets=1".to_vec());
    }
    assert!(provider.is_loaded());
    assert_eq!(inits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_backend_load_failure_propagates() {
    let provider = ZiLazyBackendProvider::new(|| Err(ZiError::serialization("backend unavailable")));
    let input = ZiExportInput::records(vec![json!({"a": 1})]);
    let err = export_tabular(&input, &ZiTabularExportOptions::default(), &provider, &ZiCancelToken::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("backend unavailable"));
    assert!(!provider.is_loaded());
}

#[tokio::test]
async fn test_shared_backend_across_concurrent_exports() {
    let backend = Arc::new(CountingBackend::default());
    let inputs: Vec<ZiExportInput> = (0..4)
        .map(|i| ZiExportInput::records(vec![json!({"i": i})]))
        .collect();
    let options = ZiTabularExportOptions::default();
    let cancel = ZiCancelToken::new();

    let results = futures::future::join_all(
        inputs.iter().map(|input| export_tabular(input, &options, &backend, &cancel)),
    )
    .await;

    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|result| result.is_ok()));
    assert_eq!(backend.writes.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_options_from_json() {
    let registry = ZiFormatterRegistry::with_builtins();
    let artifact = export_tabular_json(
        &json!({"data": [{"name": "ada"}], "columns": [{"key": "name", "formatter": "string.upper", "label": "Name"}]}),
        &json!({"book_type": "csv", "filename": "people.xlsx", "template": {"title": "People"}}),
        &registry,
        &ZiLazyBackendProvider::default(),
        &ZiCancelToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(artifact.suggested_filename, "people.csv");
    assert!(csv_text(&artifact.payload).ends_with("Name\nADA\n"));
}

#[tokio::test]
async fn test_unknown_book_type_is_rejected() {
    let registry = ZiFormatterRegistry::new();
    let err = export_tabular_json(
        &json!([{"a": 1}]),
        &json!({"book_type": "ods"}),
        &registry,
        &ZiLazyBackendProvider::default(),
        &ZiCancelToken::new(),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("ods"));
}
