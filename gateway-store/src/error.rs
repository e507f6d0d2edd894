use std::fmt;

/// Failures a `Store` implementation can raise. Distinct from
/// `gateway_core::AppError` — `Store` is the external collaborator per the
/// component boundary, so it gets its own narrow taxonomy that the
/// storage adapter maps onto the ambient error type at the seam, the same
/// way the teacher's `r2e-data::DataError` sits behind `From<DataError>
/// for r2e_core::HttpError` rather than speaking `HttpError` itself.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(m) => write!(f, "not found: {m}"),
            Self::Conflict(m) => write!(f, "conflict: {m}"),
            Self::Internal(m) => write!(f, "internal storage error: {m}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<StoreError> for gateway_core::AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(m) => gateway_core::AppError::NotFound(m),
            StoreError::Conflict(m) => {
                gateway_core::AppError::Conflict { message: m, your_version: None, current_version: None }
            }
            StoreError::Internal(m) => gateway_core::AppError::Internal(m),
        }
    }
}
