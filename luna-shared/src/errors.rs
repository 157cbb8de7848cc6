use serde::{Deserialize, Serialize};

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/storage errors
/// - E1xxx: User/session errors
/// - E2xxx: Matching errors
/// - E3xxx: Moderation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Forbidden,
    StorageFailure,
    DuplicateId,

    // User/session (E1xxx)
    UserNotFound,
    UserAlreadyRegistered,
    Underage,
    BioTooLong,

    // Matching (E2xxx)
    ScoreOutOfRange,
    CannotRateSelf,
    AlreadyRated,
    PremiumRequired,

    // Moderation (E3xxx)
    RequestNotFound,
    RequestAlreadyDecided,
    ReportNotFound,
    ReportAlreadyResolved,
    CannotReportSelf,
    TicketNotFound,
    TicketAlreadyClosed,
    AlreadyAgeVerified,
    UserNotBlocked,
}

/// The failure class a code belongs to. Callers branch on this rather than
/// on individual codes when deciding how to surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    InvalidInput,
    PermissionDenied,
    StorageFailure,
    Internal,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Forbidden => "E0004",
            Self::StorageFailure => "E0005",
            Self::DuplicateId => "E0006",

            // User/session
            Self::UserNotFound => "E1001",
            Self::UserAlreadyRegistered => "E1002",
            Self::Underage => "E1003",
            Self::BioTooLong => "E1004",

            // Matching
            Self::ScoreOutOfRange => "E2001",
            Self::CannotRateSelf => "E2002",
            Self::AlreadyRated => "E2003",
            Self::PremiumRequired => "E2004",

            // Moderation
            Self::RequestNotFound => "E3001",
            Self::RequestAlreadyDecided => "E3002",
            Self::ReportNotFound => "E3003",
            Self::ReportAlreadyResolved => "E3004",
            Self::CannotReportSelf => "E3005",
            Self::TicketNotFound => "E3006",
            Self::TicketAlreadyClosed => "E3007",
            Self::AlreadyAgeVerified => "E3008",
            Self::UserNotBlocked => "E3009",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InternalError => ErrorKind::Internal,
            Self::StorageFailure => ErrorKind::StorageFailure,
            Self::NotFound | Self::UserNotFound | Self::RequestNotFound
            | Self::ReportNotFound | Self::TicketNotFound => ErrorKind::NotFound,
            Self::Forbidden | Self::PremiumRequired => ErrorKind::PermissionDenied,
            Self::RequestAlreadyDecided | Self::ReportAlreadyResolved
            | Self::TicketAlreadyClosed | Self::AlreadyAgeVerified
            | Self::UserNotBlocked => ErrorKind::InvalidState,
            Self::ValidationError | Self::DuplicateId | Self::UserAlreadyRegistered
            | Self::Underage | Self::BioTooLong | Self::ScoreOutOfRange
            | Self::CannotRateSelf | Self::AlreadyRated
            | Self::CannotReportSelf => ErrorKind::InvalidInput,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal error")]
    Internal(#[from] anyhow::Error),

    #[error("storage failure: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Known { code, .. } => code.kind(),
            Self::Internal(_) => ErrorKind::Internal,
            Self::Storage(_) | Self::Serialization(_) => ErrorKind::StorageFailure,
            Self::Validation(_) => ErrorKind::InvalidInput,
        }
    }

    /// The stable code string surfaced to the acting user or moderator.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Known { code, .. } => code.code(),
            Self::Internal(_) => ErrorCode::InternalError.code(),
            Self::Storage(_) | Self::Serialization(_) => ErrorCode::StorageFailure.code(),
            Self::Validation(_) => ErrorCode::ValidationError.code(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
