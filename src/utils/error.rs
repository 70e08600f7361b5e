use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Reference dataset '{source_name}' could not be loaded: {message}")]
    DatasetError { source_name: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Storage,
    Configuration,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::DatasetError { .. }
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::ZipError(_) | EtlError::IoError(_) => ErrorCategory::Storage,
            EtlError::ConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            EtlError::UrlError(_) | EtlError::ValidationError { .. } => ErrorCategory::Validation,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 資料集失敗只會降級，不會中斷分類
            EtlError::DatasetError { .. } => ErrorSeverity::Low,
            EtlError::ApiError(_) => ErrorSeverity::Medium,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::UrlError(_)
            | EtlError::ProcessingError { .. }
            | EtlError::ValidationError { .. } => ErrorSeverity::High,
            EtlError::ConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                ErrorSeverity::High
            }
            EtlError::ZipError(_) | EtlError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ApiError(_) => {
                "Check network connectivity and that the dataset URL is reachable".to_string()
            }
            EtlError::CsvError(_) => {
                "Make sure the input CSV has a header row and consistent column counts"
                    .to_string()
            }
            EtlError::SerializationError(_) => {
                "Verify the JSON document is a flat object of \"key\": \"SOURCE_CATEGORY_*\" pairs"
                    .to_string()
            }
            EtlError::UrlError(_) => {
                "Paste a full absolute URL, e.g. https://www.example.com/?utm_source=google"
                    .to_string()
            }
            EtlError::DatasetError { .. } => {
                "Classification continues with pattern rules only; fix the dataset path or URL for site matching"
                    .to_string()
            }
            EtlError::ZipError(_) | EtlError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            EtlError::ConfigError { .. } => {
                "Check the TOML syntax and that [job], [input] and [output] are present".to_string()
            }
            EtlError::InvalidConfigValueError { field, .. } => {
                format!("Review the value of '{}' in the configuration or command line", field)
            }
            EtlError::ProcessingError { .. } | EtlError::ValidationError { .. } => {
                "Inspect the offending input record and correct it".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Data => format!("Data problem: {}", self),
            ErrorCategory::Storage => format!("Storage problem: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Validation => format!("Invalid input: {}", self),
        }
    }

    /// 依嚴重程度對應的程序退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
