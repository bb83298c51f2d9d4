//! Output table writer: buffers rows per table in memory and flushes once at the end
//! of the run, in the configured format.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::building::TickRow;
use crate::error::IoError;

/// One output table's accumulated rows, keyed by its file stem (e.g. a building name
/// or `"Prioridades <building>"`).
struct BufferedTable {
    stem: String,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Collects every building's (and, for Priority buildings, priorities') tick rows and
/// writes one file per table when the run completes.
pub struct OutputWriter {
    out_dir: PathBuf,
    format: OutputFormat,
    tables: Vec<BufferedTable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Xlsx,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "csv" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Xlsx => "xlsx",
        }
    }
}

impl OutputWriter {
    pub fn new(out_dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            out_dir: out_dir.into(),
            format,
            tables: Vec::new(),
        }
    }

    /// Registers a building's tick row under table `stem`, creating the table's header
    /// from `vehicle_names` on first use.
    pub fn push_building_row(&mut self, stem: &str, vehicle_names: &[&str], row: &TickRow) {
        let table = self.table_mut(stem, || {
            let mut header = vec![
                "Tiempo".to_string(),
                "Potencia Disponible".to_string(),
                "Gasto de Cargadores".to_string(),
            ];
            header.extend(vehicle_names.iter().map(|n| n.to_string()));
            header
        });

        let mut record = vec![
            row.timestamp.clone(),
            format!("{:.2}", row.available_power_kw),
            format!("{:.2}", row.power_used_kw),
        ];
        record.extend(row.battery_ratios.iter().map(|r| format!("{r:.2}")));
        table.rows.push(record);
    }

    /// Registers a priority row for a `Prioridades <building>` table.
    pub fn push_priority_row(&mut self, stem: &str, vehicle_names: &[&str], timestamp: &str, priorities: &[f64]) {
        let table = self.table_mut(stem, || {
            let mut header = vec!["Tiempo".to_string()];
            header.extend(vehicle_names.iter().map(|n| n.to_string()));
            header
        });

        let mut record = vec![timestamp.to_string()];
        record.extend(priorities.iter().map(|p| format!("{p:.2}")));
        table.rows.push(record);
    }

    fn table_mut(&mut self, stem: &str, make_header: impl FnOnce() -> Vec<String>) -> &mut BufferedTable {
        if let Some(pos) = self.tables.iter().position(|t| t.stem == stem) {
            return &mut self.tables[pos];
        }
        self.tables.push(BufferedTable {
            stem: stem.to_string(),
            header: make_header(),
            rows: Vec::new(),
        });
        self.tables.last_mut().expect("just pushed")
    }

    /// Writes every buffered table to `out_dir` in the configured format.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`] if any table cannot be written.
    pub fn flush(&self) -> Result<(), IoError> {
        std::fs::create_dir_all(&self.out_dir).map_err(|e| IoError {
            path: self.out_dir.display().to_string(),
            message: e.to_string(),
        })?;

        for table in &self.tables {
            let path = self.out_dir.join(format!("{}.{}", table.stem, self.format.extension()));
            match self.format {
                OutputFormat::Csv => write_delimited(&path, b',', table)?,
                OutputFormat::Tsv => write_delimited(&path, b'\t', table)?,
                OutputFormat::Xlsx => write_xlsx(&path, table)?,
            }
        }
        Ok(())
    }
}

fn write_delimited(path: &Path, delimiter: u8, table: &BufferedTable) -> Result<(), IoError> {
    let file = File::create(path).map_err(|e| IoError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let buf = io::BufWriter::new(file);
    let mut wtr = csv::WriterBuilder::new().delimiter(delimiter).from_writer(buf);

    wtr.write_record(&table.header).map_err(|e| IoError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    for row in &table.rows {
        wtr.write_record(row).map_err(|e| IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    }
    wtr.flush().map_err(|e| IoError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(feature = "xlsx")]
fn write_xlsx(path: &Path, table: &BufferedTable) -> Result<(), IoError> {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, h) in table.header.iter().enumerate() {
        sheet
            .write_string(0, col as u16, h)
            .map_err(|e| IoError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
    }
    for (row_idx, row) in table.rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            sheet
                .write_string((row_idx + 1) as u32, col as u16, value)
                .map_err(|e| IoError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
        }
    }
    workbook.save(path).map_err(|e| IoError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(not(feature = "xlsx"))]
fn write_xlsx(path: &Path, _table: &BufferedTable) -> Result<(), IoError> {
    Err(IoError {
        path: path.display().to_string(),
        message: "xlsx support requires building with --features xlsx".to_string(),
    })
}
