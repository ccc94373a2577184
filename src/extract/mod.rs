// src/extract/mod.rs

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::{config::Config, table};

/// `(source column, renamed column)` pairs for `title.basics.tsv`.
pub const BASICS_COLUMNS: [(&str, &str); 4] = [
    ("tconst", "imdb_id"),
    ("primaryTitle", "title"),
    ("startYear", "release_year"),
    ("genres", "genres"),
];

/// `(source column, renamed column)` pairs for `title.ratings.tsv`.
pub const RATINGS_COLUMNS: [(&str, &str); 3] = [
    ("tconst", "imdb_id"),
    ("averageRating", "rating"),
    ("numVotes", "vote_count"),
];

/// Copy the selected columns of a tab-separated file into a CSV, renaming the
/// header. Values are passed through untouched. Returns the row count.
#[tracing::instrument(level = "info", skip(input, output, columns), fields(input = %input.display(), output = %output.display()))]
pub fn project_columns(input: &Path, output: &Path, columns: &[(&str, &str)]) -> Result<u64> {
    let mut rdr = table::open_reader(input, b'\t')?;
    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {}", input.display()))?
        .clone();
    let sources: Vec<&str> = columns.iter().map(|(src, _)| *src).collect();
    let indices = table::column_indices(&headers, &sources, input)?;

    let mut wtr = table::create_writer(output)?;
    wtr.write_record(columns.iter().map(|(_, dst)| *dst))?;

    let mut rows = 0u64;
    for (idx, result) in rdr.records().enumerate() {
        let record = result
            .with_context(|| format!("TSV parse error in {} at record {}", input.display(), idx))?;
        wtr.write_record(indices.iter().map(|&i| record.get(i).unwrap_or("")))
            .with_context(|| format!("writing {}", output.display()))?;
        rows += 1;
    }
    wtr.flush()
        .with_context(|| format!("flushing {}", output.display()))?;

    Ok(rows)
}

pub fn extract_basics(cfg: &Config) -> Result<u64> {
    let output = cfg.movies_csv();
    let rows = project_columns(&cfg.basics_tsv(), &output, &BASICS_COLUMNS)?;
    info!(rows, "saved IMDb basics to {}", output.display());
    Ok(rows)
}

pub fn extract_ratings(cfg: &Config) -> Result<u64> {
    let output = cfg.ratings_csv();
    let rows = project_columns(&cfg.ratings_tsv(), &output, &RATINGS_COLUMNS)?;
    info!(rows, "saved IMDb ratings to {}", output.display());
    Ok(rows)
}

/// Extraction stage: both source tables.
pub fn run(cfg: &Config) -> Result<()> {
    extract_basics(cfg)?;
    extract_ratings(cfg)?;
    Ok(())
}
