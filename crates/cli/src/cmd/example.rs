//! Print a documented sample configuration

use anyhow::Result;

use crate::config;

pub async fn run() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}
