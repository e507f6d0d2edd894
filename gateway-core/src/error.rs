use axum::response::{IntoResponse, Response};
use axum::{http::StatusCode, Json};
use serde::Serialize;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// The wire error taxonomy, one variant per code.
///
/// A plain enum with an `IntoResponse` impl, rather than a `Box<dyn
/// Error>` or `anyhow`-style catch-all — every variant here is something
/// the gateway means to surface to a caller, never an internal panic
/// path.
#[derive(Debug)]
pub enum AppError {
    Validation(Vec<FieldError>),
    BadRequest(String),
    NotFound(String),
    AuthRequired(String),
    InvalidToken(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict {
        message: String,
        your_version: Option<i64>,
        current_version: Option<i64>,
    },
    PaymentRequired {
        message: String,
        feature: Option<String>,
    },
    MethodNotAllowed(String),
    RateLimited {
        message: String,
        retry_after: Option<u64>,
    },
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::AuthRequired(_) => "AUTH_REQUIRED",
            AppError::InvalidToken(_) => "INVALID_TOKEN",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::PaymentRequired { .. } => "PAYMENT_REQUIRED",
            AppError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            AppError::RateLimited { .. } => "RATE_LIMITED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AuthRequired(_) | AppError::InvalidToken(_) | AppError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::PaymentRequired { .. } => StatusCode::PAYMENT_REQUIRED,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::Validation(_) => "Validation failed".to_string(),
            AppError::BadRequest(m)
            | AppError::NotFound(m)
            | AppError::AuthRequired(m)
            | AppError::InvalidToken(m)
            | AppError::Unauthorized(m)
            | AppError::Forbidden(m)
            | AppError::MethodNotAllowed(m) => m.clone(),
            AppError::Conflict { message, .. } => message.clone(),
            AppError::PaymentRequired { message, .. } => message.clone(),
            AppError::RateLimited { message, .. } => message.clone(),
            AppError::Internal(m) => m.clone(),
        }
    }

    /// Build the `error` object of the response envelope.
    /// Shaped on-the-wire assembly is left to `gateway-http`'s envelope
    /// builder, which also attaches `links`; this only produces the
    /// error body's own fields.
    pub fn to_error_value(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "message": self.message(),
            "code": self.code(),
            "status": self.status().as_u16(),
        });
        let map = obj.as_object_mut().expect("object literal");
        match self {
            AppError::Validation(fields) => {
                map.insert("fields".into(), serde_json::to_value(fields).unwrap());
            }
            AppError::Conflict { your_version, current_version, .. } => {
                if let Some(v) = your_version {
                    map.insert("yourVersion".into(), serde_json::json!(v));
                }
                if let Some(v) = current_version {
                    map.insert("currentVersion".into(), serde_json::json!(v));
                }
            }
            AppError::PaymentRequired { feature, .. } => {
                if let Some(f) = feature {
                    map.insert("feature".into(), serde_json::json!(f));
                }
            }
            AppError::RateLimited { retry_after, .. } => {
                if let Some(r) = retry_after {
                    map.insert("retryAfter".into(), serde_json::json!(r));
                }
            }
            _ => {}
        }
        obj
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({ "error": self.to_error_value() });
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.code(), self.status(), self.message())
    }
}

impl std::error::Error for AppError {}

/// Generate `From<E> for AppError` bridges for foreign error types.
#[macro_export]
macro_rules! map_error {
    ( $( $err_ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$err_ty> for $crate::error::AppError {
                fn from(err: $err_ty) -> Self {
                    $crate::error::AppError::$variant(err.to_string())
                }
            }
        )*
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn parts(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let (status, body) = parts(AppError::NotFound("missing".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "missing");
    }

    #[tokio::test]
    async fn validation_carries_fields() {
        let err = AppError::Validation(vec![FieldError { field: "email".into(), message: "required".into() }]);
        let (status, body) = parts(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["fields"][0]["field"], "email");
    }

    #[tokio::test]
    async fn conflict_carries_versions() {
        let err = AppError::Conflict { message: "stale".into(), your_version: Some(1), current_version: Some(3) };
        let (status, body) = parts(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["yourVersion"], 1);
        assert_eq!(body["error"]["currentVersion"], 3);
    }

    #[test]
    fn distinct_unauthorized_codes() {
        assert_eq!(AppError::AuthRequired("x".into()).code(), "AUTH_REQUIRED");
        assert_eq!(AppError::InvalidToken("x".into()).code(), "INVALID_TOKEN");
        assert_eq!(AppError::AuthRequired("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidToken("x".into()).status(), StatusCode::UNAUTHORIZED);
    }
}
