// src/config.rs

use anyhow::Result;
use sqlx::postgres::PgConnectOptions;
use std::{fmt, path::PathBuf, str::FromStr};

use crate::error::EtlError;

pub const DEFAULT_RAW_DIR: &str = "data/raw/imdb";
pub const DEFAULT_PROCESSED_DIR: &str = "data/processed";
pub const DEFAULT_MOVIE_ROW_CAP: usize = 5000;
pub const DEFAULT_FACT_ROW_CAP: usize = 3000;
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// File locations and row caps shared by all three stages.
///
/// Row caps truncate by file order; there is no ranking behind them.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub movie_row_cap: usize,
    pub fact_row_cap: usize,
    /// Rows bound per set-based insert statement.
    pub batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
            movie_row_cap: DEFAULT_MOVIE_ROW_CAP,
            fact_row_cap: DEFAULT_FACT_ROW_CAP,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Config {
    /// Read from the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let batch_size = parsed_or(&lookup, "ETL_BATCH_SIZE", defaults.batch_size)?;
        if batch_size == 0 {
            return Err(EtlError::InvalidEnv {
                name: "ETL_BATCH_SIZE",
                value: "0".into(),
            }
            .into());
        }

        Ok(Self {
            raw_dir: lookup("ETL_RAW_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.raw_dir),
            processed_dir: lookup("ETL_PROCESSED_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.processed_dir),
            movie_row_cap: parsed_or(&lookup, "ETL_MOVIE_ROW_CAP", defaults.movie_row_cap)?,
            fact_row_cap: parsed_or(&lookup, "ETL_FACT_ROW_CAP", defaults.fact_row_cap)?,
            batch_size,
        })
    }

    pub fn basics_tsv(&self) -> PathBuf {
        self.raw_dir.join("title.basics.tsv")
    }

    pub fn ratings_tsv(&self) -> PathBuf {
        self.raw_dir.join("title.ratings.tsv")
    }

    pub fn movies_csv(&self) -> PathBuf {
        self.raw_dir.join("imdb_movies.csv")
    }

    pub fn ratings_csv(&self) -> PathBuf {
        self.raw_dir.join("imdb_ratings.csv")
    }

    pub fn cleaned_csv(&self) -> PathBuf {
        self.processed_dir.join("imdb_cleaned.csv")
    }
}

/// Connection parameters for the warehouse. Only the load stage needs these.
#[derive(Clone, PartialEq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

// keep the password out of logs
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl DbConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port_raw = required(&lookup, "DB_PORT")?;
        let port = port_raw.trim().parse().map_err(|_| EtlError::InvalidEnv {
            name: "DB_PORT",
            value: port_raw.clone(),
        })?;

        Ok(Self {
            host: required(&lookup, "DB_HOST")?,
            port,
            name: required(&lookup, "DB_NAME")?,
            user: required(&lookup, "DB_USER")?,
            password: required(&lookup, "DB_PASSWORD")?,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user)
            .password(&self.password)
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, EtlError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or(EtlError::MissingEnv(name))
}

fn parsed_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, EtlError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| EtlError::InvalidEnv { name, value: raw }),
    }
}
