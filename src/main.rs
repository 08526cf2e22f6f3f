//! homeprice server - Main entry point.

use homeprice::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::load_env_file();
    let config = Cli::parse_args().into_config()?;
    homeprice::run(config).await?;
    Ok(())
}
