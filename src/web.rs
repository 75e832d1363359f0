#![cfg(not(tarpaulin_include))]

use hurina::app;
use hurina::config::Config;
use std::env;
use std::path::PathBuf;

/// Main entry point for the web application
///
/// Takes an optional configuration file path as the only argument, falling
/// back to `$HURINA_CONFIG` and then to the compiled defaults.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    app::run(config).await
}
