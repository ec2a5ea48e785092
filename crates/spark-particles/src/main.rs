use std::path::PathBuf;

use anyhow::Result;

use spark_engine::logging::{LoggingConfig, init_logging};
use spark_particles::config::ParticlesConfig;

fn main() -> Result<()> {
    // Optional TOML config as the only argument.
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);

    let config = match config_path.as_deref().map(ParticlesConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            init_logging(LoggingConfig::default());
            log::error!("{err:#}");
            return Err(err);
        }
    };

    init_logging(LoggingConfig {
        env_filter: config.log_filter.clone(),
        ..LoggingConfig::default()
    });

    if let Err(err) = spark_particles::run(config) {
        log::error!("{err:#}");
        return Err(err);
    }

    Ok(())
}
