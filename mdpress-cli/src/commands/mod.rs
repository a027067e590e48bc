pub mod check_config;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use mdpress_core::{config, Config};

/// `--config` flag shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the config file [default: ~/.mdpress/config.yaml].
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    /// Resolve the config path and load it. Any failure here is fatal.
    pub fn load(&self) -> Result<(PathBuf, Config)> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => config::default_config_path()?,
        };
        let cfg = config::load(&path)
            .with_context(|| format!("invalid configuration ({})", path.display()))?;
        Ok((path, cfg))
    }
}
