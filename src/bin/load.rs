use anyhow::Result;
use movie_etl::{
    config::{Config, DbConfig},
    load, logging,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cfg = Config::from_env()?;
    let db = DbConfig::from_env()?;
    info!(host = %db.host, port = db.port, database = %db.name, "loading warehouse");

    let report = load::run(&cfg, &db).await?;
    for table in &report.tables {
        info!("{}", table);
    }
    Ok(())
}
