use thiserror::Error;

#[derive(Error, Debug)]
pub enum StimError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Cannot parse '{token}' as a number in {source_name} (row {row})")]
    ParseError {
        source_name: String,
        row: usize,
        token: String,
    },

    #[error("No usable data in {source_name}")]
    NoUsableData { source_name: String },

    #[error("Stimulus construction error: {message}")]
    StimulusError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Processing,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 程序退出碼，Low 不視為失敗
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl StimError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StimError::ConfigError { .. }
            | StimError::ConfigValidationError { .. }
            | StimError::InvalidConfigValueError { .. }
            | StimError::MissingConfigError { .. } => ErrorCategory::Configuration,
            StimError::CsvError(_) | StimError::ParseError { .. } | StimError::NoUsableData { .. } => {
                ErrorCategory::Input
            }
            StimError::StimulusError { .. } => ErrorCategory::Processing,
            StimError::ZipError(_) | StimError::IoError(_) | StimError::SerializationError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::Medium,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            StimError::ParseError { .. } => {
                "Check the sequence file for non-numeric text between the commas"
            }
            StimError::NoUsableData { .. } => {
                "Make sure the sequence file has at least one comma-separated row of numbers"
            }
            StimError::MissingConfigError { .. } => "Add the missing field to the session config",
            StimError::ConfigError { .. }
            | StimError::ConfigValidationError { .. }
            | StimError::InvalidConfigValueError { .. } => {
                "Review the session config against configs/session.toml"
            }
            StimError::StimulusError { .. } => {
                "Check the grating parameter lists and the sequence lengths"
            }
            StimError::CsvError(_) => "Make sure the sequence file is plain comma-separated text",
            StimError::IoError(_) => "Check that the paths exist and are readable/writable",
            StimError::SerializationError(_) | StimError::ZipError(_) => {
                "Check free disk space and permissions of the output directory"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StimError::ParseError { source_name, token, .. } => {
                format!("Sequence file '{}' contains a non-numeric value: '{}'", source_name, token)
            }
            StimError::NoUsableData { source_name } => {
                format!("Sequence file '{}' has no usable data", source_name)
            }
            StimError::IoError(e) => format!("File access failed: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StimError>;
