use std::fmt;

/// Non-retryable classifier failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalReason {
    /// HTTP 401 from the classifier
    Unauthorized,
    /// HTTP 400 from the classifier
    BadRequest,
    /// 2xx response whose body is not JSON
    MalformedResponse,
}

impl fmt::Display for FatalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalReason::Unauthorized => write!(f, "authentication failed, check the API key"),
            FatalReason::BadRequest => write!(f, "request rejected as malformed"),
            FatalReason::MalformedResponse => write!(f, "response body is not valid JSON"),
        }
    }
}

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("log source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("classifier request failed: {0}")]
    ClassifyTransient(String),

    #[error("classifier request aborted: {0}")]
    ClassifyFatal(FatalReason),

    #[error("classifier gave up after {attempts} attempts: {last_error}")]
    ClassifyExhausted { attempts: u32, last_error: String },

    #[error("unexpected classifier response shape: {0}")]
    ExtractionError(String),

    #[error("report delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable code used in log fields
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::SourceUnavailable(_) => "SOURCE503",
            AppError::ClassifyTransient(_) => "AI5001",
            AppError::ClassifyFatal(FatalReason::Unauthorized) => "AI4010",
            AppError::ClassifyFatal(FatalReason::BadRequest) => "AI4000",
            AppError::ClassifyFatal(FatalReason::MalformedResponse) => "AI5020",
            AppError::ClassifyExhausted { .. } => "AI5030",
            AppError::ExtractionError(_) => "AI5021",
            AppError::DeliveryFailed(_) => "NOTIFY5001",
            AppError::Internal(_) => "COMMON500",
        }
    }

    /// Only transport-level and non-fatal HTTP failures are worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::ClassifyTransient(_))
    }
}

/// Convenience constructors
impl AppError {
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        AppError::SourceUnavailable(msg.into())
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        AppError::ClassifyTransient(msg.into())
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        AppError::ExtractionError(msg.into())
    }

    pub fn delivery_failed(msg: impl Into<String>) -> Self {
        AppError::DeliveryFailed(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
