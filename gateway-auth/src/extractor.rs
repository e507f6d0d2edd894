use std::sync::Arc;

use gateway_core::AppError;
use gateway_web::{FromRef, FromRequestParts, Parts};

use crate::authenticator::Authenticator;
use crate::identity::Identity;

/// Extracts the caller's identity, failing the request with
/// `AUTH_REQUIRED`/`INVALID_TOKEN` if authentication didn't resolve one.
/// Mirrors `r2e_security::extractor::AuthenticatedUser`, generalised from
/// "verified JWT only" to the gateway's three-path `Authenticator`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser(pub Identity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    Arc<Authenticator>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authenticator = Arc::<Authenticator>::from_ref(state);
        let identity = authenticator
            .authenticate(&parts.headers)
            .await?
            .ok_or_else(|| AppError::AuthRequired("authentication required".into()))?;
        Ok(AuthenticatedUser(identity))
    }
}

/// Like [`AuthenticatedUser`] but doesn't fail the request when no
/// identity was established — useful for routes under `auth.mode:
/// optional` that behave differently for anonymous callers rather than
/// rejecting them.
#[derive(Debug, Clone, PartialEq)]
pub struct MaybeAuthenticatedUser(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeAuthenticatedUser
where
    S: Send + Sync,
    Arc<Authenticator>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authenticator = Arc::<Authenticator>::from_ref(state);
        let identity = authenticator.authenticate(&parts.headers).await?;
        Ok(MaybeAuthenticatedUser(identity))
    }
}
