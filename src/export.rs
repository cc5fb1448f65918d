//! XLSX export of flattened records
//!
//! Writes one workbook with a single sheet: the fixed header row followed by
//! one row per record, values in header order. Columns are auto-sized to the
//! longest stringified value after writing.

use crate::error::Result;
use crate::flatten::{FlatRecord, field_names};
use rust_xlsxwriter::{Workbook, Worksheet};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

/// Name of the single sheet in the output workbook
pub const SHEET_NAME: &str = "Aziende";

/// Padding added to the longest value of each column
const COLUMN_PADDING: usize = 2;

/// Upper bound on auto-sized column widths
const MAX_COLUMN_WIDTH: usize = 60;

/// Write the records to an XLSX file and return the data row count.
///
/// Parent directories are created as needed; an existing file at the
/// destination is overwritten without merging.
///
/// # Errors
/// Returns an error if the directories cannot be created or the workbook
/// cannot be serialized to disk.
pub fn export_to_xlsx<P: AsRef<Path>>(records: &[FlatRecord], output_path: P) -> Result<usize> {
    let output_path = output_path.as_ref();

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let mut widths: Vec<usize> = Vec::new();
    for (col, name) in field_names().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
        widths.push(name.chars().count());
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, value) in record.values().iter().enumerate() {
            if let Some(width) = display_width(value) {
                widths[col] = widths[col].max(width);
            }
            write_cell(worksheet, row, col as u16, value)?;
        }
    }

    for (col, width) in widths.iter().enumerate() {
        let width = (width + COLUMN_PADDING).min(MAX_COLUMN_WIDTH);
        worksheet.set_column_width(col as u16, width as f64)?;
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    workbook.save(output_path)?;

    info!(
        rows = records.len(),
        path = %output_path.display(),
        "workbook written"
    );
    Ok(records.len())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> Result<()> {
    match value {
        Value::Null => {}
        Value::String(text) => {
            worksheet.write_string(row, col, text)?;
        }
        Value::Number(number) => match number.as_f64() {
            Some(float) => {
                worksheet.write_number(row, col, float)?;
            }
            None => {
                worksheet.write_string(row, col, number.to_string())?;
            }
        },
        Value::Bool(boolean) => {
            worksheet.write_boolean(row, col, *boolean)?;
        }
        // Non-scalar leftovers render as compact JSON text.
        other => {
            worksheet.write_string(row, col, other.to_string())?;
        }
    }
    Ok(())
}

/// Rendered length of a cell value; empty cells do not contribute to the
/// column width.
fn display_width(value: &Value) -> Option<usize> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.chars().count()),
        other => Some(other.to_string().len()),
    }
}
