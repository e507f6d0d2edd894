use async_trait::async_trait;

use crate::identity::Identity;

/// Why a bearer token failed verification. Kept distinct from
/// `gateway_core::AppError` so verifiers don't need to depend on the
/// HTTP error taxonomy; `Authenticator` maps this into `AppError::InvalidToken`.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyError {
    Expired,
    Malformed(String),
    Rejected(String),
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyError::Expired => write!(f, "token expired"),
            VerifyError::Malformed(m) => write!(f, "malformed token: {m}"),
            VerifyError::Rejected(m) => write!(f, "token rejected: {m}"),
        }
    }
}

impl std::error::Error for VerifyError {}

/// The external collaborator that actually checks a bearer token's
/// signature and turns its claims into an `Identity`. The gateway
/// never implements signature verification itself — a real deployment
/// plugs in a verifier backed by its identity provider's JWKS, a
/// shared HMAC secret, or similar.
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError>;
}
