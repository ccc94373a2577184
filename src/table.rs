// src/table.rs
//
// Thin helpers around `csv` for the stage files: open with context, enforce
// the expected header, create outputs with their parent directory.

use anyhow::{Context, Result};
use csv::{Reader, ReaderBuilder, StringRecord, Writer};
use std::{
    fs::{self, File},
    path::Path,
};

use crate::error::EtlError;

/// Open a delimited file that has a header row.
///
/// Raw IMDb dumps are tab-separated and unquoted (titles contain stray `"`),
/// so quoting is only honoured for comma-separated files.
pub fn open_reader(path: &Path, delimiter: u8) -> Result<Reader<File>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .quoting(delimiter != b'\t')
        .from_reader(file);
    Ok(rdr)
}

/// Position of each of `columns` in `headers`. Any absent column is fatal.
pub fn column_indices(headers: &StringRecord, columns: &[&str], path: &Path) -> Result<Vec<usize>> {
    columns
        .iter()
        .map(|&col| {
            headers
                .iter()
                .position(|h| h.trim() == col)
                .ok_or_else(|| {
                    anyhow::Error::from(EtlError::MissingColumn {
                        column: col.to_string(),
                        path: path.to_path_buf(),
                    })
                })
        })
        .collect()
}

/// Open `path` and check it carries every column in `columns`.
pub fn open_checked(path: &Path, delimiter: u8, columns: &[&str]) -> Result<Reader<File>> {
    let mut rdr = open_reader(path, delimiter)?;
    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .clone();
    column_indices(&headers, columns, path)?;
    Ok(rdr)
}

pub fn create_writer(path: &Path) -> Result<Writer<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    Writer::from_path(path).with_context(|| format!("creating {}", path.display()))
}
