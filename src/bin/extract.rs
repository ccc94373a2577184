use anyhow::Result;
use movie_etl::{config::Config, extract, logging};

fn main() -> Result<()> {
    logging::init();
    let cfg = Config::from_env()?;
    extract::run(&cfg)
}
