// src/load/project.rs
//
// Table-specific projections of the staged rows. Pure; the warehouse module
// only ships what these return.

use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;
use tracing::warn;

use crate::model::{coerce, CleanedRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct MovieRow {
    pub imdb_id: String,
    pub title: Option<String>,
    pub release_year: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRow {
    pub date_id: i32,
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub decade: i32,
}

impl DateRow {
    /// January 1st of `year`. `None` when the year has no calendar date or the
    /// key would not fit the column.
    pub fn for_year(year: i32) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let month = date.month() as i32;
        let day = date.day() as i32;
        let date_id = year
            .checked_mul(10_000)?
            .checked_add(month * 100 + day)?;
        Some(Self {
            date_id,
            year,
            month,
            day,
            decade: year.div_euclid(10) * 10,
        })
    }
}

/// Key of the `dim_date` row a year maps to.
pub fn date_key(year: i32) -> Option<i32> {
    DateRow::for_year(year).map(|d| d.date_id)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactRow {
    /// Natural key; resolved to `movie_id` by the warehouse at insert time.
    pub imdb_id: String,
    pub date_id: i32,
    pub rating: f64,
    pub vote_count: i64,
}

/// `dim_movie`: first row per `imdb_id`, capped in file order, implausible
/// years nulled after the cap.
pub fn movie_rows(rows: &[CleanedRecord], cap: usize) -> Vec<MovieRow> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|r| !coerce::is_missing(&r.imdb_id))
        .filter(|r| seen.insert(r.imdb_id.as_str()))
        .take(cap)
        .map(|r| MovieRow {
            imdb_id: r.imdb_id.clone(),
            title: coerce::text(&r.title),
            release_year: coerce::plausible_year(r.release_year),
        })
        .collect()
}

/// `dim_genre`: distinct non-missing genre names in first-seen order.
pub fn genre_rows(rows: &[CleanedRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|r| r.genre.as_deref())
        .filter(|g| seen.insert(*g))
        .map(str::to_string)
        .collect()
}

/// `dim_date`: one row per distinct year, first-seen order.
pub fn date_rows(rows: &[CleanedRecord]) -> Vec<DateRow> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for year in rows.iter().filter_map(|r| r.release_year) {
        if !seen.insert(year) {
            continue;
        }
        match DateRow::for_year(year) {
            Some(d) => out.push(d),
            None => warn!(year, "year has no date key, skipping"),
        }
    }
    out
}

/// `fact_movie_performance`: complete rows only, capped in file order.
///
/// Rows sharing `(imdb_id, date_id)` after the cap collapse to the first one,
/// which is what the conflict-skip insert would keep anyway.
pub fn fact_rows(rows: &[CleanedRecord], cap: usize) -> Vec<FactRow> {
    let complete = rows
        .iter()
        .filter(|r| !coerce::is_missing(&r.imdb_id))
        .filter_map(|r| match (r.release_year, r.rating, r.vote_count) {
            (Some(year), Some(rating), Some(vote_count)) => Some((r, year, rating, vote_count)),
            _ => None,
        })
        .take(cap);

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (r, year, rating, vote_count) in complete {
        let Some(date_id) = date_key(year) else {
            continue;
        };
        if seen.insert((r.imdb_id.as_str(), date_id)) {
            out.push(FactRow {
                imdb_id: r.imdb_id.clone(),
                date_id,
                rating,
                vote_count,
            });
        }
    }
    out
}
