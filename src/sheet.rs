//! Convert `.xlsx` workbooks in a folder to UTF-8 CSV files.

use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, open_workbook_auto};
use tracing::{error, info};

use crate::error::{Error, Result, SheetError};

const XLSX_EXTENSION: &str = "xlsx";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetMode {
    /// Only the first sheet, written as `{base}.csv`.
    #[default]
    First,
    /// Every sheet; `{base}_{sheet}.csv` when there is more than one.
    All,
}

#[derive(Debug, Default)]
pub struct ConversionReport {
    /// (workbook, csv) pairs, one per written sheet.
    pub converted: Vec<(PathBuf, PathBuf)>,
    pub failed: Vec<(PathBuf, String)>,
}

/// All `.xlsx` files directly inside `dir`, sorted by path.
pub fn find_workbooks(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut found = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        let is_xlsx = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(XLSX_EXTENSION));
        if is_xlsx && path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

fn csv_name(base: &str, sheet: &str, sheet_count: usize) -> String {
    if sheet_count == 1 {
        format!("{}.csv", base)
    } else {
        format!("{}_{}.csv", base, sheet)
    }
}

fn write_csv(range: &Range<Data>, out: &Path) -> std::result::Result<(), SheetError> {
    let mut writer = csv::Writer::from_path(out)?;
    for row in range.rows() {
        writer.write_record(row.iter().map(cell_text))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Convert one workbook into CSV files inside `output_dir`.
pub fn convert_workbook(
    path: &Path,
    output_dir: &Path,
    mode: SheetMode,
) -> std::result::Result<Vec<PathBuf>, SheetError> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();
    if names.is_empty() {
        return Err(SheetError::NoSheets);
    }

    let selected: Vec<String> = match mode {
        SheetMode::First => names.into_iter().take(1).collect(),
        SheetMode::All => names,
    };

    let base = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut written = Vec::with_capacity(selected.len());
    for sheet in &selected {
        let range = workbook.worksheet_range(sheet)?;
        let out = output_dir.join(csv_name(&base, sheet, selected.len()));
        write_csv(&range, &out)?;

        info!(workbook = %path.display(), sheet = %sheet, csv = %out.display(), "converted sheet");
        written.push(out);
    }
    Ok(written)
}

/// Convert every workbook in `input_dir`, continuing past failures.
///
/// `output_dir` defaults to `input_dir` and is created when missing.
pub fn convert_folder(
    input_dir: &Path,
    output_dir: Option<&Path>,
    mode: SheetMode,
) -> Result<ConversionReport> {
    let output_dir = output_dir.unwrap_or(input_dir);
    std::fs::create_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))?;

    let workbooks = find_workbooks(input_dir)?;
    let mut report = ConversionReport::default();
    if workbooks.is_empty() {
        info!(dir = %input_dir.display(), "no .xlsx files found");
        return Ok(report);
    }
    info!(count = workbooks.len(), "found .xlsx files");

    for workbook in workbooks {
        match convert_workbook(&workbook, output_dir, mode) {
            Ok(outputs) => report
                .converted
                .extend(outputs.into_iter().map(|csv| (workbook.clone(), csv))),
            Err(e) => {
                error!(workbook = %workbook.display(), "conversion failed: {}", e);
                report.failed.push((workbook, e.to_string()));
            }
        }
    }

    Ok(report)
}
