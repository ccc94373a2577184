// src/main.rs

use anyhow::Result;
use movie_etl::{
    config::{Config, DbConfig},
    extract, load, logging, transform,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    logging::init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let cfg = Config::from_env()?;
    let db = DbConfig::from_env()?;

    // ─── 3) extract → transform → load ───────────────────────────────
    extract::run(&cfg)?;
    transform::run(&cfg)?;
    let report = load::run(&cfg, &db).await?;
    for table in &report.tables {
        info!("{}", table);
    }

    info!("all stages done");
    Ok(())
}
