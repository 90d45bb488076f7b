use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolcallError {
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Tool error: {0}")]
    ToolError(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for ToolcallError {
    fn from(err: anyhow::Error) -> Self {
        ToolcallError::Other(format!("{:#}", err))
    }
}

impl From<crate::tools::ToolError> for ToolcallError {
    fn from(err: crate::tools::ToolError) -> Self {
        ToolcallError::ToolError(err.to_string())
    }
}

impl From<String> for ToolcallError {
    fn from(msg: String) -> Self {
        ToolcallError::Other(msg)
    }
}

impl From<&str> for ToolcallError {
    fn from(msg: &str) -> Self {
        ToolcallError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ToolcallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ToolcallError::ApiError {
            status: 503,
            message: "model not loaded".to_string(),
        };
        assert_eq!(err.to_string(), "API error (status 503): model not loaded");
    }

    #[test]
    fn test_from_str_is_other() {
        let err: ToolcallError = "boom".into();
        assert!(matches!(err, ToolcallError::Other(ref m) if m == "boom"));
    }
}
