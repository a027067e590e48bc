//! `mdpress check-config`: validate the config file without syncing.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::ConfigArgs;

/// Arguments for `mdpress check-config`.
#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl CheckConfigArgs {
    pub fn run(self) -> Result<()> {
        let (path, cfg) = self.config.load()?;
        let home = mdpress_core::config::home()?;

        println!("{} {}", "✓".green().bold(), path.display());
        println!("  manifest     {}", cfg.source_url);
        println!("  endpoint     {}/{}", cfg.api_base(), cfg.wordpress_type);
        println!("  user         {}", cfg.username);
        println!("  fingerprints {}", cfg.fingerprint_path_at(&home).display());
        println!("  timeout      {}s", cfg.timeout.as_secs());
        Ok(())
    }
}
