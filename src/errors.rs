use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err)
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::HabitNotFound(_) => Self::not_found(err.to_string()),
            _ => Self::bad_request(err.to_string()),
        }
    }
}

impl From<BackupError> for AppError {
    fn from(err: BackupError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Rejected mutation of the habit snapshot.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("habit {0} not found")]
    HabitNotFound(String),
    #[error("habit name must not be empty")]
    InvalidName,
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("{0}")]
    InvalidValue(String),
}

/// A backup document that failed validation. Nothing is modified when this
/// is returned.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("invalid backup format: {0}")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_errors_map_to_status_codes() {
        let missing: AppError = DataError::HabitNotFound("42".to_string()).into();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.message, "habit 42 not found");

        let bad: AppError = DataError::InvalidDate("tomorrow".to_string()).into();
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn backup_errors_are_bad_requests() {
        let err: AppError = BackupError::InvalidFormat("missing habits".to_string()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "invalid backup format: missing habits");
    }
}
