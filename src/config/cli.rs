use crate::config::settings::Settings;
use crate::config::toml_config::{AggregationConfig, OutputConfig, SourceConfig, TomlConfig};
use crate::core::tally::SortKey;
use crate::report::OutputFormat;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Clone, Parser)]
#[command(name = "country-tally")]
#[command(about = "Tally a payments provider's customers by country using a read-only API key")]
pub struct CliConfig {
    /// Restricted or secret API key with read access to Customers
    #[arg(long, env = "STRIPE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Maximum number of customers to process (10-10000)
    #[arg(long, short)]
    pub limit: Option<u64>,

    /// Customers requested per page (1-100)
    #[arg(long)]
    pub page_size: Option<u32>,

    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// TOML settings file; flags override its values
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// table, json or csv
    #[arg(long, short)]
    pub format: Option<OutputFormat>,

    /// count or country
    #[arg(long)]
    pub sort: Option<SortKey>,

    #[arg(long, conflicts_with = "descending")]
    pub ascending: bool,

    /// Overrides `ascending = true` from the settings file
    #[arg(long)]
    pub descending: bool,

    /// Write the report to <dir>/country_tally.<ext> instead of stdout
    #[arg(long)]
    pub output_dir: Option<String>,

    #[arg(long, help = "Hide the progress bar")]
    pub no_progress: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    fn as_overlay(&self) -> TomlConfig {
        TomlConfig {
            source: SourceConfig {
                api_key: self.api_key.clone(),
                base_url: self.base_url.clone(),
                timeout_seconds: self.timeout_seconds,
            },
            aggregation: AggregationConfig {
                limit: self.limit,
                page_size: self.page_size,
            },
            output: OutputConfig {
                format: self.format,
                sort: self.sort,
                ascending: self.sort_direction(),
                dir: self.output_dir.clone(),
            },
        }
    }

    fn sort_direction(&self) -> Option<bool> {
        if self.ascending {
            Some(true)
        } else if self.descending {
            Some(false)
        } else {
            None
        }
    }

    /// Flag > settings file > default.
    pub fn load_settings(&self) -> Result<Settings> {
        let base = match &self.config {
            Some(path) => {
                tracing::debug!("Loading settings file {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        Settings::from_config(base.overlay(self.as_overlay()))
    }
}
