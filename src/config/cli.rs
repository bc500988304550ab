use crate::config::map_config::MapConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "stone-map")]
#[command(about = "Project the Pictish stones dataset onto WGS84 and build web map markers")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// CSV dataset location (http, https or file URL)
    #[arg(long)]
    pub source_url: Option<String>,

    /// Directory for the generated map files
    #[arg(long)]
    pub output_path: Option<String>,

    /// Give up on the dataset download after this many seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Keep positions on OSGB36 instead of shifting them to WGS84
    #[arg(long)]
    pub no_datum_shift: bool,

    /// Pack all output files into a single zip archive
    #[arg(long)]
    pub bundle: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Log CPU and memory usage per phase
    #[arg(long)]
    pub monitor: bool,
}

impl CliConfig {
    /// Loads the TOML file when given, then applies command-line overrides.
    pub fn resolve(&self) -> Result<MapConfig> {
        let mut config = match &self.config {
            Some(path) => MapConfig::from_file(path)?,
            None => MapConfig::default(),
        };

        if let Some(url) = &self.source_url {
            config.source.endpoint = url.clone();
        }
        if let Some(path) = &self.output_path {
            config.load.output_path = path.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.source.timeout_seconds = Some(timeout);
        }
        if self.no_datum_shift {
            config.projection.apply_datum_shift = false;
        }
        if self.bundle {
            config.load.bundle = true;
        }

        Ok(config)
    }
}
