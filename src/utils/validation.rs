use crate::utils::error::{Result, TallyError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TallyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(TallyError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(TallyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(TallyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(TallyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(TallyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Keys are never echoed back in errors, only their length.
pub fn validate_api_key(field_name: &str, key: &str, min_len: usize) -> Result<()> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(TallyError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    if trimmed.len() < min_len || trimmed.chars().any(char::is_whitespace) {
        return Err(TallyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("<{} chars>", trimmed.len()),
            reason: format!(
                "API key must be at least {} characters without spaces",
                min_len
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("base_url", "https://api.stripe.com").is_ok());
        assert!(validate_url("base_url", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("base_url", "").is_err());
        assert!(validate_url("base_url", "invalid-url").is_err());
        assert!(validate_url("base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("limit", 10u64, 10, 10_000).is_ok());
        assert!(validate_range("limit", 10_000u64, 10, 10_000).is_ok());
        assert!(validate_range("limit", 9u64, 10, 10_000).is_err());
        assert!(validate_range("limit", 10_001u64, 10, 10_000).is_err());
    }

    #[test]
    fn test_validate_api_key_hides_value() {
        assert!(validate_api_key("api_key", "rk_test_0123456789abcdef", 20).is_ok());
        assert!(matches!(
            validate_api_key("api_key", "   ", 20),
            Err(TallyError::MissingConfigError { .. })
        ));

        match validate_api_key("api_key", "rk_short", 20) {
            Err(TallyError::InvalidConfigValueError { value, .. }) => {
                assert_eq!(value, "<8 chars>");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output_dir", "./reports").is_ok());
        assert!(validate_path("output_dir", "").is_err());
        assert!(validate_path("output_dir", "bad\0path").is_err());
    }
}
