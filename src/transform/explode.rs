use crate::model::{coerce, CleanedRecord};

pub const GENRE_DELIMITER: char = ',';

/// Split a genre list on commas. Tokens are kept verbatim and in order; an
/// empty list still yields one (empty) token.
pub fn split_genres(genres: &str) -> impl Iterator<Item = &str> {
    genres.split(GENRE_DELIMITER)
}

/// One copy of `row` per genre token, `genre` set to that token.
pub fn explode(row: &CleanedRecord, genres: &str) -> Vec<CleanedRecord> {
    split_genres(genres)
        .map(|token| CleanedRecord {
            genre: coerce::text(token),
            ..row.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> CleanedRecord {
        CleanedRecord {
            imdb_id: "tt0001".into(),
            title: "Foo".into(),
            release_year: Some(1995),
            genre: None,
            rating: Some(6.1),
            vote_count: Some(42),
        }
    }

    #[test]
    fn k_tokens_give_k_rows_in_order() {
        let rows = explode(&base(), "Drama,Comedy,Romance");
        let genres: Vec<_> = rows.iter().map(|r| r.genre.as_deref()).collect();
        assert_eq!(genres, vec![Some("Drama"), Some("Comedy"), Some("Romance")]);
        for r in &rows {
            assert_eq!(
                CleanedRecord {
                    genre: None,
                    ..r.clone()
                },
                base()
            );
        }
    }

    #[test]
    fn single_genre_is_one_row() {
        let rows = explode(&base(), "Documentary");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].genre.as_deref(), Some("Documentary"));
    }

    #[test]
    fn empty_tokens_are_kept_as_missing() {
        let rows = explode(&base(), "Drama,,Comedy");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].genre, None);
    }
}
