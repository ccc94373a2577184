// src/transform/mod.rs

pub mod explode;

use anyhow::{Context, Result};
use std::{collections::HashMap, path::Path};
use tracing::{debug, info};

use crate::{
    config::Config,
    model::{CleanedRecord, RatingRecord, TitleRecord, MOVIE_COLUMNS, RATING_COLUMNS},
    table,
};

/// Ratings keyed by `imdb_id`, kept in file order per key.
#[derive(Debug, Default)]
pub struct RatingIndex {
    by_id: HashMap<String, Vec<RatingRecord>>,
}

impl RatingIndex {
    pub fn insert(&mut self, rating: RatingRecord) {
        self.by_id
            .entry(rating.imdb_id.clone())
            .or_default()
            .push(rating);
    }

    pub fn get(&self, imdb_id: &str) -> &[RatingRecord] {
        self.by_id.get(imdb_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl FromIterator<RatingRecord> for RatingIndex {
    fn from_iter<I: IntoIterator<Item = RatingRecord>>(iter: I) -> Self {
        let mut idx = RatingIndex::default();
        for r in iter {
            idx.insert(r);
        }
        idx
    }
}

/// Left-join one title against its ratings and explode the genre list.
///
/// - no genre → no rows
/// - no rating → one row per genre with rating/vote_count missing
/// - several ratings → one joined row per rating, each exploded
pub fn clean_title(title: &TitleRecord, ratings: &[RatingRecord]) -> Vec<CleanedRecord> {
    let Some(genres) = title.genres.as_deref() else {
        return Vec::new();
    };

    let joined: Vec<(Option<f64>, Option<i64>)> = if ratings.is_empty() {
        vec![(None, None)]
    } else {
        ratings.iter().map(|r| (r.rating, r.vote_count)).collect()
    };

    joined
        .into_iter()
        .flat_map(|(rating, vote_count)| {
            let row = CleanedRecord {
                imdb_id: title.imdb_id.clone(),
                title: title.title.clone(),
                release_year: title.release_year,
                genre: None,
                rating,
                vote_count,
            };
            explode::explode(&row, genres)
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransformSummary {
    pub titles_read: u64,
    pub titles_without_genre: u64,
    pub rows_written: u64,
}

pub fn load_ratings(path: &Path) -> Result<RatingIndex> {
    let mut rdr = table::open_checked(path, b',', &RATING_COLUMNS)?;
    let mut index = RatingIndex::default();
    for (idx, result) in rdr.deserialize::<RatingRecord>().enumerate() {
        let rating = result
            .with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))?;
        index.insert(rating);
    }
    Ok(index)
}

/// Join `movies` with `ratings`, drop genre-less titles, explode genres and
/// write the cleaned CSV. Titles are streamed; ratings are held in memory.
#[tracing::instrument(level = "info", skip(movies, ratings, output), fields(movies = %movies.display(), output = %output.display()))]
pub fn transform_files(movies: &Path, ratings: &Path, output: &Path) -> Result<TransformSummary> {
    let index = load_ratings(ratings)?;
    debug!(ids = index.len(), "ratings indexed");

    let mut rdr = table::open_checked(movies, b',', &MOVIE_COLUMNS)?;
    let mut wtr = table::create_writer(output)?;
    let mut summary = TransformSummary::default();

    for (idx, result) in rdr.deserialize::<TitleRecord>().enumerate() {
        let title = result
            .with_context(|| format!("CSV parse error in {} at record {}", movies.display(), idx))?;
        summary.titles_read += 1;

        if title.genres.is_none() {
            summary.titles_without_genre += 1;
            continue;
        }

        for row in clean_title(&title, index.get(&title.imdb_id)) {
            wtr.serialize(&row)
                .with_context(|| format!("writing {}", output.display()))?;
            summary.rows_written += 1;
        }
    }

    // nothing serialized means no header was written either
    if summary.rows_written == 0 {
        wtr.write_record(crate::model::CLEANED_COLUMNS)?;
    }
    wtr.flush()
        .with_context(|| format!("flushing {}", output.display()))?;

    Ok(summary)
}

/// Transformation stage.
pub fn run(cfg: &Config) -> Result<TransformSummary> {
    let output = cfg.cleaned_csv();
    let summary = transform_files(&cfg.movies_csv(), &cfg.ratings_csv(), &output)?;
    info!(
        titles = summary.titles_read,
        dropped = summary.titles_without_genre,
        rows = summary.rows_written,
        "saved cleaned IMDb data to {}",
        output.display()
    );
    Ok(summary)
}
