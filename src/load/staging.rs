use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use crate::{
    model::{CleanedRecord, CLEANED_COLUMNS},
    table,
};

/// The cleaned file parsed once and shared by every table projection.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Staging {
    rows: Vec<CleanedRecord>,
}

impl Staging {
    #[tracing::instrument(level = "info", skip(path), fields(path = %path.display()))]
    pub fn read(path: &Path) -> Result<Self> {
        let mut rdr = table::open_checked(path, b',', &CLEANED_COLUMNS)?;
        let mut rows = Vec::new();
        for (idx, result) in rdr.deserialize::<CleanedRecord>().enumerate() {
            let row = result
                .with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))?;
            rows.push(row);
        }
        debug!(rows = rows.len(), "staged cleaned rows");
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[CleanedRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<CleanedRecord>> for Staging {
    fn from(rows: Vec<CleanedRecord>) -> Self {
        Self { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_float_rendered_numbers_and_markers() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("imdb_cleaned.csv");
        fs::write(
            &path,
            "imdb_id,title,release_year,genres,rating,vote_count
tt0001,Foo,1995.0,Drama,7.1,1500.0
tt0002,Bar,\\N,,oops,
",
        )?;

        let staging = Staging::read(&path)?;
        assert_eq!(staging.len(), 2);
        assert_eq!(
            staging.rows()[0],
            CleanedRecord {
                imdb_id: "tt0001".into(),
                title: "Foo".into(),
                release_year: Some(1995),
                genre: Some("Drama".into()),
                rating: Some(7.1),
                vote_count: Some(1500),
            }
        );
        let second = &staging.rows()[1];
        assert_eq!(second.release_year, None);
        assert_eq!(second.genre, None);
        assert_eq!(second.rating, None);
        assert_eq!(second.vote_count, None);
        Ok(())
    }

    #[test]
    fn missing_required_column_is_fatal() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("imdb_cleaned.csv");
        fs::write(&path, "imdb_id,title,release_year,genres,rating\n")?;

        let err = Staging::read(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EtlError>(),
            Some(EtlError::MissingColumn { column, .. }) if column == "vote_count"
        ));
        Ok(())
    }
}
