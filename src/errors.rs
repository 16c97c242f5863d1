use axum::http::StatusCode;

/// Failures reported by a [`crate::storage::KeyValueStore`].
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backend refused the write (quota, read-only medium, ...).
    #[error("storage rejected the write: {0}")]
    Rejected(String),
}

/// Why a stored snapshot could not be restored.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("stored state is not valid json: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TempLifeInputError {
    #[error("temporary life must be a whole number, e.g. 20 or +20 (got {0:?})")]
    Malformed(String),

    #[error("temporary life amount is too large: {0}")]
    OutOfRange(String),
}

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
}

impl From<TempLifeInputError> for AppError {
    fn from(err: TempLifeInputError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
