//! Consumption table reader, dispatching on file extension.

use std::path::Path;

use crate::error::IoError;

/// One row from the consumption table: the raw `Tiempo` cell plus per-building
/// percentage strings in header order.
#[derive(Debug, Clone)]
pub struct InputRow {
    pub tiempo: String,
    pub values: Vec<String>,
}

/// A parsed consumption table: building names (header, after `Tiempo`) and rows.
#[derive(Debug, Clone)]
pub struct InputTable {
    pub buildings: Vec<String>,
    pub rows: Vec<InputRow>,
}

/// Reads a consumption table, selecting comma, tab, or spreadsheet parsing by the file
/// extension (`.csv`, `.tsv`, `.xlsx`).
///
/// # Errors
///
/// Returns [`IoError`] if the file cannot be read, or the extension is unrecognized, or
/// (for `.xlsx`) this binary was built without the `xlsx` feature.
pub fn read_table(path: &Path) -> Result<InputTable, IoError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => read_delimited(path, b','),
        Some("tsv") => read_delimited(path, b'\t'),
        Some("xlsx") => read_xlsx(path),
        other => Err(IoError {
            path: path.display().to_string(),
            message: format!("unrecognized input extension: {other:?}"),
        }),
    }
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<InputTable, IoError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let headers = rdr
        .headers()
        .map_err(|e| IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?
        .clone();
    let buildings: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let tiempo = record.get(0).unwrap_or_default().to_string();
        let values = record.iter().skip(1).map(str::to_string).collect();
        rows.push(InputRow { tiempo, values });
    }

    Ok(InputTable { buildings, rows })
}

#[cfg(feature = "xlsx")]
fn read_xlsx(path: &Path) -> Result<InputTable, IoError> {
    use calamine::{Reader, open_workbook_auto};

    let mut workbook = open_workbook_auto(path).map_err(|e| IoError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let sheet_name = workbook.sheet_names().first().cloned().ok_or_else(|| IoError {
        path: path.display().to_string(),
        message: "workbook has no sheets".to_string(),
    })?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let mut rows_iter = range.rows();
    let header = rows_iter.next().ok_or_else(|| IoError {
        path: path.display().to_string(),
        message: "empty sheet".to_string(),
    })?;
    let buildings: Vec<String> = header.iter().skip(1).map(|c| c.to_string()).collect();

    let rows = rows_iter
        .map(|r| InputRow {
            tiempo: r.first().map(|c| c.to_string()).unwrap_or_default(),
            values: r.iter().skip(1).map(|c| c.to_string()).collect(),
        })
        .collect();

    Ok(InputTable { buildings, rows })
}

#[cfg(not(feature = "xlsx"))]
fn read_xlsx(path: &Path) -> Result<InputTable, IoError> {
    Err(IoError {
        path: path.display().to_string(),
        message: "xlsx support requires building with --features xlsx".to_string(),
    })
}
