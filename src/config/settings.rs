use crate::adapters::stripe::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECONDS};
use crate::config::toml_config::TomlConfig;
use crate::core::aggregator::{MAX_LIMIT, MAX_PAGE_SIZE, MIN_LIMIT};
use crate::core::ConfigProvider;
use crate::report::RenderOptions;
use crate::utils::error::{Result, TallyError};
use crate::utils::validation::{
    validate_api_key, validate_path, validate_range, validate_url, Validate,
};

pub const DEFAULT_LIMIT: u64 = 1_000;
pub const MIN_API_KEY_LEN: usize = 20;
const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Fully resolved, validated settings for one run.
#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub limit: u64,
    pub page_size: u32,
    pub render: RenderOptions,
    pub output_dir: Option<String>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("limit", &self.limit)
            .field("page_size", &self.page_size)
            .field("render", &self.render)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl Settings {
    /// Applies defaults to a merged config and validates the result.
    pub fn from_config(config: TomlConfig) -> Result<Self> {
        let api_key = config
            .source
            .api_key
            .ok_or_else(|| TallyError::MissingConfigError {
                field: "api_key (--api-key or STRIPE_API_KEY)".to_string(),
            })?;

        if let Some(start) = api_key.find("${") {
            // 環境變數未設定
            return Err(TallyError::MissingConfigError {
                field: format!("environment variable {}", &api_key[start..]),
            });
        }

        let defaults = RenderOptions::default();
        let settings = Settings {
            api_key: api_key.trim().to_string(),
            base_url: config
                .source
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_seconds: config
                .source
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            limit: config.aggregation.limit.unwrap_or(DEFAULT_LIMIT),
            page_size: config.aggregation.page_size.unwrap_or(MAX_PAGE_SIZE),
            render: RenderOptions {
                format: config.output.format.unwrap_or(defaults.format),
                sort: config.output.sort.unwrap_or(defaults.sort),
                ascending: config.output.ascending.unwrap_or(defaults.ascending),
            },
            output_dir: config.output.dir,
        };

        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_api_key("api_key", &self.api_key, MIN_API_KEY_LEN)?;
        validate_url("base_url", &self.base_url)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, MAX_TIMEOUT_SECONDS)?;
        validate_range("limit", self.limit, MIN_LIMIT, MAX_LIMIT)?;
        validate_range("page_size", self.page_size, 1, MAX_PAGE_SIZE)?;
        if let Some(dir) = &self.output_dir {
            validate_path("output_dir", dir)?;
        }
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn limit(&self) -> u64 {
        self.limit
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }
}
