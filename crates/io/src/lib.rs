//! `geodash-io`: file loaders for boundary documents and attribute tables.

pub mod csv;
pub mod error;
pub mod geojson;
pub mod xlsx;

use std::path::Path;

use geodash_core::Table;

pub use error::LoadError;
pub use geojson::{load_boundary, save_document, write_document};

/// Load a table, choosing the reader from the file extension.
///
/// `.csv`, `.tsv` and `.txt` go through the delimited reader (delimiter
/// sniffed); `.xlsx`, `.xlsm`, `.xls`, `.xlsb` and `.ods` through calamine.
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "txt" => csv::import(path),
        "tsv" => csv::import_with_delimiter(path, b'\t'),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => xlsx::import(path, sheet),
        _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Load a table written with a positional index column (a blank or
/// `Unnamed: N` header) and drop that column.
pub fn load_attribute_table(path: &Path, sheet: Option<&str>) -> Result<Table, LoadError> {
    let mut table = load_table(path, sheet)?;
    let dropped = table.drop_index_columns();
    if !dropped.is_empty() {
        log::debug!("{}: dropped index columns {:?}", path.display(), dropped);
    }
    Ok(table)
}
