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

//! # Spreadsheet Backends
//!
//! The workbook assembler never writes bytes itself. It asks a
//! [`ZiBackendProvider`] for a [`ZiSpreadsheetBackend`] and hands it the
//! finished [`ZiWorkbook`].
//!
//! - **ZiXlsxBackend**: rust_xlsxwriter workbook with bold headers, number
//!   and date formats, column widths and freeze panes
//! - **ZiCsvBackend**: one CSV document per sheet; several sheets are packed
//!   into a zip archive
//! - **ZiDefaultBackend**: dispatches on [`ZiBookType`]
//!
//! Providers resolve the backend lazily and at most once.

use std::io::{Cursor, Write};
use std::sync::Arc;

use async_trait::async_trait;
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::{Result, ZiError};
use crate::export::rows::ZiCell;
use crate::export::sheet::ZiSheet;
use crate::export::workbook::ZiWorkbook;

pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Spreadsheet container format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZiBookType {
    #[default]
    Xlsx,
    Csv,
}

impl ZiBookType {
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "xlsx" => Ok(ZiBookType::Xlsx),
            "csv" => Ok(ZiBookType::Csv),
            other => Err(ZiError::validation(format!(
                "unsupported book type '{}', expected xlsx or csv",
                other
            ))),
        }
    }

    /// File extension of a workbook with `sheet_count` sheets.
    pub fn extension(&self, sheet_count: usize) -> &'static str {
        match self {
            ZiBookType::Xlsx => "xlsx",
            ZiBookType::Csv if sheet_count > 1 => "zip",
            ZiBookType::Csv => "csv",
        }
    }

    pub fn content_type(&self, sheet_count: usize) -> &'static str {
        match self {
            ZiBookType::Xlsx => XLSX_CONTENT_TYPE,
            ZiBookType::Csv if sheet_count > 1 => ZIP_CONTENT_TYPE,
            ZiBookType::Csv => CSV_CONTENT_TYPE,
        }
    }
}

/// Library-level write options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiWriteOptions {
    pub book_type: ZiBookType,
    /// Deflate multi-sheet CSV archives. XLSX output is always compressed.
    pub compression: bool,
}

impl Default for ZiWriteOptions {
    fn default() -> Self {
        Self {
            book_type: ZiBookType::Xlsx,
            compression: true,
        }
    }
}

/// Renders a workbook to bytes.
pub trait ZiSpreadsheetBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn write(&self, workbook: &ZiWorkbook, options: &ZiWriteOptions) -> Result<Vec<u8>>;
}

/// XLSX writer backed by rust_xlsxwriter.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZiXlsxBackend;

impl ZiSpreadsheetBackend for ZiXlsxBackend {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn write(&self, workbook: &ZiWorkbook, _options: &ZiWriteOptions) -> Result<Vec<u8>> {
        let mut book = Workbook::new();
        let header_format = Format::new().set_bold();

        for sheet in &workbook.sheets {
            let worksheet = book.add_worksheet();
            worksheet.set_name(&sheet.name)?;

            let number_format = sheet
                .number_format
                .as_ref()
                .map(|format| Format::new().set_num_format(format));
            let date_format = Format::new().set_num_format(&sheet.date_format);

            for (row_index, row) in sheet.rows.iter().enumerate() {
                let row_num = cast_row_num(row_index)?;
                let is_header = sheet.header_row == Some(row_index);

                for (col_index, cell) in row.iter().enumerate() {
                    let col_num = cast_col_num(col_index)?;
                    match cell {
                        ZiCell::Empty => {}
                        ZiCell::Bool(value) => {
                            worksheet.write_boolean(row_num, col_num, *value)?;
                        }
                        ZiCell::Number(value) => match &number_format {
                            Some(format) => {
                                worksheet.write_number_with_format(row_num, col_num, *value, format)?;
                            }
                            None => {
                                worksheet.write_number(row_num, col_num, *value)?;
                            }
                        },
                        ZiCell::Text(value) if is_header => {
                            worksheet.write_string_with_format(row_num, col_num, value, &header_format)?;
                        }
                        ZiCell::Text(value) => {
                            worksheet.write_string(row_num, col_num, value)?;
                        }
                        ZiCell::DateTime(value) => {
                            worksheet.write_datetime_with_format(row_num, col_num, value, &date_format)?;
                        }
                    }
                }
            }

            for (col_index, width) in sheet.column_widths.iter().enumerate() {
                worksheet.set_column_width(cast_col_num(col_index)?, *width)?;
            }
            if sheet.frozen_rows > 0 {
                worksheet.set_freeze_panes(cast_row_num(sheet.frozen_rows)?, 0)?;
            }
        }

        Ok(book.save_to_buffer()?)
    }
}

/// CSV writer; several sheets become a zip archive of `<sheet>.csv` files.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZiCsvBackend;

impl ZiCsvBackend {
    fn sheet_to_csv(sheet: &ZiSheet) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
        for row in &sheet.rows {
            writer.write_record(row.iter().map(ZiCell::display_text))?;
        }
        writer
            .into_inner()
            .map_err(|err| ZiError::serialization(format!("csv flush: {}", err)))
    }
}

impl ZiSpreadsheetBackend for ZiCsvBackend {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn write(&self, workbook: &ZiWorkbook, options: &ZiWriteOptions) -> Result<Vec<u8>> {
        match workbook.sheets.as_slice() {
            [] => Ok(Vec::new()),
            [sheet] => Self::sheet_to_csv(sheet),
            sheets => {
                let method = if options.compression {
                    CompressionMethod::Deflated
                } else {
                    CompressionMethod::Stored
                };
                let file_options = FileOptions::default().compression_method(method);

                let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
                for sheet in sheets {
                    archive.start_file(format!("{}.csv", sheet.name), file_options)?;
                    archive.write_all(&Self::sheet_to_csv(sheet)?)?;
                }
                Ok(archive.finish()?.into_inner())
            }
        }
    }
}

/// Picks the XLSX or CSV backend from the requested book type.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZiDefaultBackend;

impl ZiSpreadsheetBackend for ZiDefaultBackend {
    fn name(&self) -> &'static str {
        "default"
    }

    fn write(&self, workbook: &ZiWorkbook, options: &ZiWriteOptions) -> Result<Vec<u8>> {
        match options.book_type {
            ZiBookType::Xlsx => ZiXlsxBackend.write(workbook, options),
            ZiBookType::Csv => ZiCsvBackend.write(workbook, options),
        }
    }
}

/// Source of the spreadsheet backend for a tabular export.
#[async_trait]
pub trait ZiBackendProvider: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn ZiSpreadsheetBackend>>;
}

/// An already constructed backend.
#[async_trait]
impl<B> ZiBackendProvider for Arc<B>
where
    B: ZiSpreadsheetBackend + 'static,
{
    async fn load(&self) -> Result<Arc<dyn ZiSpreadsheetBackend>> {
        let backend: Arc<dyn ZiSpreadsheetBackend> = self.clone();
        Ok(backend)
    }
}

type BackendInit = dyn Fn() -> Result<Arc<dyn ZiSpreadsheetBackend>> + Send + Sync;

/// Builds the backend on first use and reuses it afterwards.
///
/// The cache belongs to the provider instance; nothing is shared globally.
pub struct ZiLazyBackendProvider {
    cell: OnceCell<Arc<dyn ZiSpreadsheetBackend>>,
    init: Arc<BackendInit>,
}

impl ZiLazyBackendProvider {
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn ZiSpreadsheetBackend>> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            init: Arc::new(init),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}

impl Default for ZiLazyBackendProvider {
    fn default() -> Self {
        Self::new(|| Ok(Arc::new(ZiDefaultBackend) as Arc<dyn ZiSpreadsheetBackend>))
    }
}

#[async_trait]
impl ZiBackendProvider for ZiLazyBackendProvider {
    async fn load(&self) -> Result<Arc<dyn ZiSpreadsheetBackend>> {
        let backend = self
            .cell
            .get_or_try_init(|| async { (self.init)() })
            .await?;
        Ok(Arc::clone(backend))
    }
}

fn cast_row_num(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| ZiError::serialization(format!("row index overflow: {}", value)))
}

fn cast_col_num(value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| ZiError::serialization(format!("column index overflow: {}", value)))
}
