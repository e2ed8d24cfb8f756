use crate::core::tally::SortKey;
use crate::report::OutputFormat;
use crate::utils::error::{Result, TallyError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional settings file. Every field may be omitted; command-line flags are
/// layered on top with [`TomlConfig::overlay`].
///
/// ```toml
/// [source]
/// api_key = "${STRIPE_API_KEY}"
///
/// [aggregation]
/// limit = 2500
///
/// [output]
/// format = "csv"
/// dir = "./reports"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregationConfig {
    pub limit: Option<u64>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
    pub sort: Option<SortKey>,
    pub ascending: Option<bool>,
    pub dir: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TallyError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TallyError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STRIPE_API_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TallyError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Values present in `top` win over values in `self`.
    pub fn overlay(self, top: TomlConfig) -> TomlConfig {
        TomlConfig {
            source: SourceConfig {
                api_key: top.source.api_key.or(self.source.api_key),
                base_url: top.source.base_url.or(self.source.base_url),
                timeout_seconds: top.source.timeout_seconds.or(self.source.timeout_seconds),
            },
            aggregation: AggregationConfig {
                limit: top.aggregation.limit.or(self.aggregation.limit),
                page_size: top.aggregation.page_size.or(self.aggregation.page_size),
            },
            output: OutputConfig {
                format: top.output.format.or(self.output.format),
                sort: top.output.sort.or(self.output.sort),
                ascending: top.output.ascending.or(self.output.ascending),
                dir: top.output.dir.or(self.output.dir),
            },
        }
    }
}
