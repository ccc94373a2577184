use anyhow::Result;
use movie_etl::{config::Config, logging, transform};

fn main() -> Result<()> {
    logging::init();
    let cfg = Config::from_env()?;
    transform::run(&cfg)?;
    Ok(())
}
