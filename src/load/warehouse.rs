// src/load/warehouse.rs

use anyhow::{Context, Result};
use sqlx::{
    postgres::{PgArguments, PgConnectOptions, PgConnection},
    query::Query,
    Connection, Postgres,
};
use std::fmt;
use tracing::{debug, info};

use super::project::{DateRow, FactRow, MovieRow};

pub const SCHEMA_SQL: &str = include_str!("schema.sql");

const INSERT_MOVIES: &str = "
    INSERT INTO dim_movie (imdb_id, title, release_year)
    SELECT * FROM UNNEST($1::text[], $2::text[], $3::int4[])
    ON CONFLICT (imdb_id) DO NOTHING";

const INSERT_GENRES: &str = "
    INSERT INTO dim_genre (genre_name)
    SELECT * FROM UNNEST($1::text[])
    ON CONFLICT (genre_name) DO NOTHING";

const INSERT_DATES: &str = "
    INSERT INTO dim_date (date_id, year, month, day, decade)
    SELECT * FROM UNNEST($1::int4[], $2::int4[], $3::int4[], $4::int4[], $5::int4[])
    ON CONFLICT (date_id) DO NOTHING";

// The join against dim_movie resolves the surrogate key and drops rows whose
// movie is unknown; the join against dim_date keeps the foreign key satisfied.
const INSERT_FACTS: &str = "
    INSERT INTO fact_movie_performance (movie_id, date_id, rating, vote_count)
    SELECT m.movie_id, v.date_id, v.rating, v.vote_count
    FROM UNNEST($1::text[], $2::int4[], $3::float8[], $4::int8[])
             AS v (imdb_id, date_id, rating, vote_count),
         dim_movie m,
         dim_date d
    WHERE m.imdb_id = v.imdb_id
      AND d.date_id = v.date_id
    ON CONFLICT (movie_id, date_id) DO NOTHING";

type PgQuery = Query<'static, Postgres, PgArguments>;

/// Outcome of loading one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLoad {
    pub table: &'static str,
    /// Rows sent after projection.
    pub offered: u64,
    /// Rows that actually landed; the rest hit a conflict or a missing movie.
    pub inserted: u64,
}

impl TableLoad {
    pub fn skipped(&self) -> u64 {
        self.offered.saturating_sub(self.inserted)
    }
}

impl fmt::Display for TableLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} offered, {} inserted, {} skipped",
            self.table,
            self.offered,
            self.inserted,
            self.skipped()
        )
    }
}

/// The relational target. Every load opens its own connection, runs all of
/// its batches inside one transaction and closes the connection again.
#[derive(Debug, Clone)]
pub struct Warehouse {
    options: PgConnectOptions,
    batch_size: usize,
}

impl Warehouse {
    pub fn new(options: PgConnectOptions, batch_size: usize) -> Self {
        Self {
            options,
            batch_size: batch_size.max(1),
        }
    }

    async fn connect(&self) -> Result<PgConnection> {
        PgConnection::connect_with(&self.options)
            .await
            .context("connecting to warehouse")
    }

    /// Create the star schema if it isn't there yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        let mut conn = self.connect().await?;
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&mut conn)
            .await
            .context("creating warehouse schema")?;
        conn.close().await.context("closing connection")?;
        Ok(())
    }

    async fn load_batches<T, F>(&self, table: &'static str, rows: &[T], build: F) -> Result<TableLoad>
    where
        F: Fn(&[T]) -> PgQuery,
    {
        let mut conn = self.connect().await?;
        let mut tx = conn
            .begin()
            .await
            .with_context(|| format!("starting {} transaction", table))?;

        let mut inserted = 0u64;
        for (n, chunk) in rows.chunks(self.batch_size).enumerate() {
            let done = build(chunk)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("inserting batch {} into {}", n, table))?
                .rows_affected();
            debug!(table, batch = n, rows = chunk.len(), inserted = done, "batch written");
            inserted += done;
        }

        tx.commit()
            .await
            .with_context(|| format!("committing {}", table))?;
        conn.close().await.context("closing connection")?;

        let load = TableLoad {
            table,
            offered: rows.len() as u64,
            inserted,
        };
        info!(
            table,
            offered = load.offered,
            inserted = load.inserted,
            skipped = load.skipped(),
            "{} loaded",
            table
        );
        Ok(load)
    }

    pub async fn load_dim_movie(&self, rows: &[MovieRow]) -> Result<TableLoad> {
        self.load_batches("dim_movie", rows, |chunk| {
            sqlx::query(INSERT_MOVIES)
                .bind(chunk.iter().map(|r| r.imdb_id.clone()).collect::<Vec<_>>())
                .bind(chunk.iter().map(|r| r.title.clone()).collect::<Vec<_>>())
                .bind(chunk.iter().map(|r| r.release_year).collect::<Vec<_>>())
        })
        .await
    }

    pub async fn load_dim_genre(&self, genres: &[String]) -> Result<TableLoad> {
        self.load_batches("dim_genre", genres, |chunk| {
            sqlx::query(INSERT_GENRES).bind(chunk.to_vec())
        })
        .await
    }

    pub async fn load_dim_date(&self, rows: &[DateRow]) -> Result<TableLoad> {
        self.load_batches("dim_date", rows, |chunk| {
            sqlx::query(INSERT_DATES)
                .bind(chunk.iter().map(|d| d.date_id).collect::<Vec<_>>())
                .bind(chunk.iter().map(|d| d.year).collect::<Vec<_>>())
                .bind(chunk.iter().map(|d| d.month).collect::<Vec<_>>())
                .bind(chunk.iter().map(|d| d.day).collect::<Vec<_>>())
                .bind(chunk.iter().map(|d| d.decade).collect::<Vec<_>>())
        })
        .await
    }

    /// Facts whose movie is not in `dim_movie` are dropped without error.
    pub async fn load_fact_movie_performance(&self, rows: &[FactRow]) -> Result<TableLoad> {
        self.load_batches("fact_movie_performance", rows, |chunk| {
            sqlx::query(INSERT_FACTS)
                .bind(chunk.iter().map(|f| f.imdb_id.clone()).collect::<Vec<_>>())
                .bind(chunk.iter().map(|f| f.date_id).collect::<Vec<_>>())
                .bind(chunk.iter().map(|f| f.rating).collect::<Vec<_>>())
                .bind(chunk.iter().map(|f| f.vote_count).collect::<Vec<_>>())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    //! Round trips against a real Postgres. Point `ETL_TEST_DATABASE_URL` at a
    //! scratch database and run with `--ignored`; the four tables are dropped
    //! and recreated.

    use super::*;
    use crate::load::project;
    use crate::model::CleanedRecord;
    use std::str::FromStr;

    #[test]
    fn table_load_report() {
        let load = TableLoad {
            table: "dim_genre",
            offered: 5,
            inserted: 3,
        };
        assert_eq!(load.skipped(), 2);
        assert_eq!(load.to_string(), "dim_genre: 5 offered, 3 inserted, 2 skipped");
    }

    #[test]
    fn schema_declares_conflict_keys() {
        assert!(SCHEMA_SQL.contains("imdb_id      TEXT NOT NULL UNIQUE"));
        assert!(SCHEMA_SQL.contains("genre_name TEXT NOT NULL UNIQUE"));
        assert!(SCHEMA_SQL.contains("date_id INTEGER PRIMARY KEY"));
        assert!(SCHEMA_SQL.contains("UNIQUE (movie_id, date_id)"));
    }

    async fn scratch_warehouse() -> Result<(Warehouse, PgConnection)> {
        let url = std::env::var("ETL_TEST_DATABASE_URL")
            .context("set ETL_TEST_DATABASE_URL to run warehouse tests")?;
        let options = PgConnectOptions::from_str(&url)?;
        let mut conn = PgConnection::connect_with(&options).await?;
        sqlx::raw_sql(
            "DROP TABLE IF EXISTS fact_movie_performance, dim_date, dim_genre, dim_movie",
        )
        .execute(&mut conn)
        .await?;
        let wh = Warehouse::new(options, 2);
        wh.ensure_schema().await?;
        Ok((wh, conn))
    }

    fn staged() -> Vec<CleanedRecord> {
        let rec = |id: &str, year: Option<i32>, genre: &str, rating: Option<f64>, votes: Option<i64>| {
            CleanedRecord {
                imdb_id: id.into(),
                title: format!("Movie {}", id),
                release_year: year,
                genre: Some(genre.into()),
                rating,
                vote_count: votes,
            }
        };
        vec![
            rec("tt1", Some(1995), "Drama", Some(7.0), Some(100)),
            rec("tt1", Some(1995), "Comedy", Some(7.0), Some(100)),
            rec("tt2", Some(1700), "Drama", Some(5.0), Some(3)),
            rec("tt3", Some(2001), "Horror", Some(6.2), Some(40)),
            rec("tt4", None, "Short", None, None),
        ]
    }

    async fn count(conn: &mut PgConnection, table: &str) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(conn)
            .await?;
        Ok(n)
    }

    #[tokio::test]
    #[ignore = "needs ETL_TEST_DATABASE_URL"]
    async fn load_is_idempotent() -> Result<()> {
        let (wh, mut conn) = scratch_warehouse().await?;
        let rows = staged();

        for pass in 0..2 {
            let movies = wh.load_dim_movie(&project::movie_rows(&rows, 5000)).await?;
            let genres = wh.load_dim_genre(&project::genre_rows(&rows)).await?;
            let dates = wh.load_dim_date(&project::date_rows(&rows)).await?;
            let facts = wh
                .load_fact_movie_performance(&project::fact_rows(&rows, 3000))
                .await?;

            let inserted = [movies, genres, dates, facts].map(|l| l.inserted);
            if pass == 0 {
                assert_eq!(inserted, [4, 4, 3, 3]);
            } else {
                assert_eq!(inserted, [0, 0, 0, 0]);
            }
        }

        assert_eq!(count(&mut conn, "dim_movie").await?, 4);
        assert_eq!(count(&mut conn, "fact_movie_performance").await?, 3);

        // 1700 is outside the plausible range for dim_movie but still dated
        let (year,): (Option<i32>,) =
            sqlx::query_as("SELECT release_year FROM dim_movie WHERE imdb_id = 'tt2'")
                .fetch_one(&mut conn)
                .await?;
        assert_eq!(year, None);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs ETL_TEST_DATABASE_URL"]
    async fn facts_without_movie_are_skipped() -> Result<()> {
        let (wh, mut conn) = scratch_warehouse().await?;
        let rows = staged();

        // only tt3 makes it into dim_movie
        let known: Vec<_> = project::movie_rows(&rows, 5000)
            .into_iter()
            .filter(|m| m.imdb_id == "tt3")
            .collect();
        wh.load_dim_movie(&known).await?;
        wh.load_dim_date(&project::date_rows(&rows)).await?;

        let facts = project::fact_rows(&rows, 3000);
        let load = wh.load_fact_movie_performance(&facts).await?;
        assert_eq!(load.offered, 3);
        assert_eq!(load.inserted, 1);

        let orphans: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM fact_movie_performance f
             LEFT JOIN dim_movie m ON m.movie_id = f.movie_id
             WHERE m.imdb_id IS NULL",
        )
        .fetch_one(&mut conn)
        .await?;
        assert_eq!(orphans.0, 0);
        Ok(())
    }
}
