// src/load/mod.rs

pub mod project;
pub mod staging;
pub mod warehouse;

use anyhow::Result;
use tracing::info;

use crate::config::{Config, DbConfig};
use staging::Staging;
use warehouse::{TableLoad, Warehouse};

/// Per-table outcome of one load run, in load order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub tables: Vec<TableLoad>,
}

impl LoadReport {
    pub fn inserted(&self) -> u64 {
        self.tables.iter().map(|t| t.inserted).sum()
    }
}

/// Load every table from one staging set. Dimensions go first so the fact
/// load can resolve its keys.
pub async fn load_staging(wh: &Warehouse, staging: &Staging, cfg: &Config) -> Result<LoadReport> {
    let rows = staging.rows();
    let mut tables = Vec::with_capacity(4);

    tables.push(
        wh.load_dim_movie(&project::movie_rows(rows, cfg.movie_row_cap))
            .await?,
    );
    tables.push(wh.load_dim_genre(&project::genre_rows(rows)).await?);
    tables.push(wh.load_dim_date(&project::date_rows(rows)).await?);
    tables.push(
        wh.load_fact_movie_performance(&project::fact_rows(rows, cfg.fact_row_cap))
            .await?,
    );

    Ok(LoadReport { tables })
}

/// Load stage: stage the cleaned file once, make sure the schema exists,
/// then load the four tables.
#[tracing::instrument(level = "info", skip_all)]
pub async fn run(cfg: &Config, db: &DbConfig) -> Result<LoadReport> {
    let staging = Staging::read(&cfg.cleaned_csv())?;
    info!(rows = staging.len(), "staged {}", cfg.cleaned_csv().display());

    let wh = Warehouse::new(db.connect_options(), cfg.batch_size);
    wh.ensure_schema().await?;

    let report = load_staging(&wh, &staging, cfg).await?;
    info!(inserted = report.inserted(), "warehouse load finished");
    Ok(report)
}
