pub mod application;
pub mod calculator;
pub mod lead;

use mortgage_calc_core::config::MortgageConfig;
use tracing::debug;

/// Load `--config` when given, otherwise the built-in defaults.
pub fn load_config(path: Option<&str>) -> Result<MortgageConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let config = MortgageConfig::load(path)?;
            debug!(path, programs = config.programs.len(), "configuration loaded");
            Ok(config)
        }
        None => Ok(MortgageConfig::default()),
    }
}

/// Single-threaded runtime for the one request a command makes.
pub fn runtime() -> Result<tokio::runtime::Runtime, Box<dyn std::error::Error>> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
