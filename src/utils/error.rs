use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Invalid API key: {message}")]
    Unauthorized { message: String },

    #[error("API key is not permitted to list customers: {message}")]
    Forbidden { message: String },

    #[error("Rate limited by provider: {message}")]
    RateLimited { message: String },

    #[error("Provider returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed provider response: {message}")]
    MalformedResponse { message: String },

    #[error("Run was cancelled before completion")]
    Cancelled,

    #[error("Run was superseded by a newer run")]
    Superseded,

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Credential,
    Upstream,
    Response,
    Run,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TallyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TallyError::Unauthorized { .. } | TallyError::Forbidden { .. } => {
                ErrorCategory::Credential
            }
            TallyError::RateLimited { .. }
            | TallyError::Upstream { .. }
            | TallyError::Network(_) => ErrorCategory::Upstream,
            TallyError::MalformedResponse { .. } => ErrorCategory::Response,
            TallyError::Cancelled | TallyError::Superseded => ErrorCategory::Run,
            TallyError::ConfigValidationError { .. }
            | TallyError::InvalidConfigValueError { .. }
            | TallyError::MissingConfigError { .. } => ErrorCategory::Configuration,
            TallyError::CsvError(_) | TallyError::IoError(_) | TallyError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 被新的執行取代或使用者中斷，不算失敗
            ErrorCategory::Run => ErrorSeverity::Low,
            ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Credential | ErrorCategory::Response | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Message suitable for showing to the person who supplied the key.
    pub fn user_friendly_message(&self) -> String {
        match self {
            TallyError::Unauthorized { message }
            | TallyError::Forbidden { message }
            | TallyError::RateLimited { message }
            | TallyError::Upstream { message, .. }
            | TallyError::MalformedResponse { message } => message.clone(),
            TallyError::Network(_) => "Could not reach the payments provider".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TallyError::Unauthorized { .. } => "Check that the API key is complete and not revoked",
            TallyError::Forbidden { .. } => {
                "Use a restricted key with read access to Customers"
            }
            TallyError::RateLimited { .. } => "Wait a moment and run again, or lower --limit",
            TallyError::Upstream { .. } | TallyError::Network(_) => {
                "Check your network connection and the provider status page, then retry"
            }
            TallyError::MalformedResponse { .. } => "Verify --base-url points at the provider API",
            TallyError::Cancelled | TallyError::Superseded => "Run again to get a fresh tally",
            TallyError::ConfigValidationError { .. }
            | TallyError::InvalidConfigValueError { .. }
            | TallyError::MissingConfigError { .. } => "Fix the configuration value and retry",
            TallyError::CsvError(_) | TallyError::IoError(_) | TallyError::SerializationError(_) => {
                "Check that the output directory is writable"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, TallyError>;
