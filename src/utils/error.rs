use thiserror::Error;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("Token received does not match configured value")]
    Unauthorized,

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Malformed webhook payload: {message}")]
    MalformedPayload { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Project lookup failed: {message}")]
    ProjectLookupFailure { message: String },

    #[error("Failed to start build for project '{project}': {message}")]
    BuildTriggerFailure { project: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl HookError {
    pub fn status_code(&self) -> u16 {
        match self {
            HookError::Unauthorized => 403,
            HookError::BadRequest { .. } | HookError::MalformedPayload { .. } => 400,
            _ => 500,
        }
    }

    /// 只有 token 不符是預期內的拒絕，其餘錯誤都要讓呼叫端看到
    pub fn is_fatal(&self) -> bool {
        !matches!(self, HookError::Unauthorized)
    }

    pub fn config(message: impl Into<String>) -> Self {
        HookError::ConfigError {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        HookError::MalformedPayload {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        HookError::BadRequest {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HookError>;
