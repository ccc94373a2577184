// src/model/mod.rs

pub mod coerce;

use serde::{Deserialize, Serialize};

/// Header of the extracted basics CSV, in file order.
pub const MOVIE_COLUMNS: [&str; 4] = ["imdb_id", "title", "release_year", "genres"];
/// Header of the extracted ratings CSV, in file order.
pub const RATING_COLUMNS: [&str; 3] = ["imdb_id", "rating", "vote_count"];
/// Header of the cleaned CSV, in file order.
pub const CLEANED_COLUMNS: [&str; 6] = [
    "imdb_id",
    "title",
    "release_year",
    "genres",
    "rating",
    "vote_count",
];

/// One row of `imdb_movies.csv`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TitleRecord {
    pub imdb_id: String,
    pub title: String,
    #[serde(deserialize_with = "coerce::de_year")]
    pub release_year: Option<i32>,
    /// Comma-delimited genre list.
    #[serde(deserialize_with = "coerce::de_text")]
    pub genres: Option<String>,
}

/// One row of `imdb_ratings.csv`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatingRecord {
    pub imdb_id: String,
    #[serde(deserialize_with = "coerce::de_rating")]
    pub rating: Option<f64>,
    #[serde(deserialize_with = "coerce::de_count")]
    pub vote_count: Option<i64>,
}

/// One (title, genre) row of `imdb_cleaned.csv`. Missing values are written
/// as empty fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub imdb_id: String,
    pub title: String,
    #[serde(deserialize_with = "coerce::de_year")]
    pub release_year: Option<i32>,
    /// A single genre; the column keeps its pre-explode name.
    #[serde(rename = "genres", deserialize_with = "coerce::de_text")]
    pub genre: Option<String>,
    #[serde(deserialize_with = "coerce::de_rating")]
    pub rating: Option<f64>,
    #[serde(deserialize_with = "coerce::de_count")]
    pub vote_count: Option<i64>,
}
