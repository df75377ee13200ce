use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Malformed payload from {endpoint}: {message}")]
    MalformedPayload { endpoint: String, message: String },

    #[error("Unexpected response from {endpoint}: {message}")]
    UnexpectedResponse { endpoint: String, message: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Upstream,
    Data,
    Configuration,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScoutError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScoutError::ApiError(_) => ErrorCategory::Network,
            ScoutError::HttpStatus { .. }
            | ScoutError::UnexpectedResponse { .. }
            | ScoutError::NotFound { .. } => ErrorCategory::Upstream,
            ScoutError::MalformedPayload { .. }
            | ScoutError::CsvError(_)
            | ScoutError::SerializationError(_)
            | ScoutError::ProcessingError { .. } => ErrorCategory::Data,
            ScoutError::ConfigError { .. }
            | ScoutError::MissingConfigError { .. }
            | ScoutError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ScoutError::ZipError(_) | ScoutError::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ScoutError::NotFound { .. }
            | ScoutError::ApiError(_)
            | ScoutError::HttpStatus { .. }
            | ScoutError::MalformedPayload { .. }
            | ScoutError::UnexpectedResponse { .. } => ErrorSeverity::Medium,
            ScoutError::ConfigError { .. }
            | ScoutError::MissingConfigError { .. }
            | ScoutError::InvalidConfigValueError { .. }
            | ScoutError::CsvError(_)
            | ScoutError::SerializationError(_)
            | ScoutError::ProcessingError { .. } => ErrorSeverity::High,
            ScoutError::ZipError(_) | ScoutError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScoutError::ApiError(e) if e.is_timeout() => {
                "The API did not answer in time".to_string()
            }
            ScoutError::ApiError(_) => "Could not reach the API".to_string(),
            ScoutError::HttpStatus { status, message } => {
                format!("The API rejected the request ({}): {}", status, message)
            }
            ScoutError::MissingConfigError { field } => {
                format!("{} is not configured", field)
            }
            ScoutError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid {}: {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your network connection and try again",
            ErrorCategory::Upstream => {
                "Check the API key, the target name and the remaining API quota"
            }
            ErrorCategory::Data => "Retry later; the API returned data in an unexpected shape",
            ErrorCategory::Configuration => {
                "Check the command-line flags, the profile file and the .env file"
            }
            ErrorCategory::Io => "Check that the output path exists and is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
