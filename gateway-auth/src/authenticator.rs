use std::sync::Arc;

use dashmap::DashSet;
use gateway_core::config::{AuthConfig, AuthMode};
use gateway_core::logging::warn_trust_unverified_once;
use gateway_core::AppError;
use gateway_web::HeaderMap;

use crate::bearer::bearer_token_from_headers;
use crate::identity::Identity;
use crate::snippet::extract_snippet_identity;
use crate::unverified::{decode_unverified, fingerprint};
use crate::verifier::AuthVerifier;

/// Orchestrates the gateway's three auth paths against a single request's
/// headers: trusted snippet headers, a verified bearer token, and (last
/// resort, opt-in) an unverified bearer token decode. One `Authenticator`
/// is built once at startup from `GatewayConfig::auth` and shared across
/// requests behind an `Arc`.
pub struct Authenticator {
    mode: AuthMode,
    trust_snippets: bool,
    trust_unverified: bool,
    verifier: Option<Arc<dyn AuthVerifier>>,
    /// Token fingerprints we've already logged the trustUnverified
    /// warning for, so a chatty caller doesn't spam the logs once per
    /// request.
    warned: DashSet<String>,
}

impl Authenticator {
    pub fn new(config: &AuthConfig, verifier: Option<Arc<dyn AuthVerifier>>) -> Self {
        Self {
            mode: config.mode,
            trust_snippets: config.trust_snippets,
            trust_unverified: config.trust_unverified,
            verifier,
            warned: DashSet::new(),
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Resolve the caller's identity for one request. `Ok(None)` means
    /// "no identity, and that's fine" (mode is `None`, or mode is
    /// `Optional` and no credentials were presented). A malformed or
    /// rejected credential is always an error, regardless of mode — a
    /// caller that attempts auth and gets it wrong doesn't get treated
    /// as anonymous.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Option<Identity>, AppError> {
        if self.mode == AuthMode::None {
            return Ok(None);
        }

        if self.trust_snippets {
            if let Some(identity) = extract_snippet_identity(headers) {
                return Ok(Some(identity));
            }
        }

        match bearer_token_from_headers(headers)? {
            Some(token) => self.authenticate_bearer(token).await.map(Some),
            None => match self.mode {
                AuthMode::Required => Err(AppError::AuthRequired("missing authorization".into())),
                _ => Ok(None),
            },
        }
    }

    async fn authenticate_bearer(&self, token: &str) -> Result<Identity, AppError> {
        if let Some(verifier) = &self.verifier {
            return verifier.verify(token).await.map_err(|e| AppError::InvalidToken(e.to_string()));
        }
        if self.trust_unverified {
            let fp = fingerprint(token);
            if self.warned.insert(fp.clone()) {
                warn_trust_unverified_once(&fp);
            }
            return decode_unverified(token);
        }
        Err(AppError::InvalidToken("no token verifier configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gateway_web::{HeaderName, HeaderValue};
    use jsonwebtoken::{encode, EncodingKey, Header as JwtHeader};
    use serde::Serialize;

    use crate::verifier::VerifyError;

    struct AlwaysOk;

    #[async_trait]
    impl AuthVerifier for AlwaysOk {
        async fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
            Ok(Identity::new(format!("verified:{token}")))
        }
    }

    struct AlwaysRejects;

    #[async_trait]
    impl AuthVerifier for AlwaysRejects {
        async fn verify(&self, _token: &str) -> Result<Identity, VerifyError> {
            Err(VerifyError::Rejected("bad signature".into()))
        }
    }

    fn bearer_headers(token: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(gateway_web::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}")).unwrap());
        h
    }

    fn auth_config(mode: AuthMode, trust_snippets: bool, trust_unverified: bool) -> AuthConfig {
        AuthConfig { mode, trust_snippets, trust_unverified }
    }

    #[tokio::test]
    async fn mode_none_never_authenticates() {
        let auth = Authenticator::new(&auth_config(AuthMode::None, false, false), Some(Arc::new(AlwaysOk)));
        let result = auth.authenticate(&bearer_headers("tok")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn required_without_credentials_errors() {
        let auth = Authenticator::new(&auth_config(AuthMode::Required, false, false), Some(Arc::new(AlwaysOk)));
        let err = auth.authenticate(&HeaderMap::new()).await.unwrap_err();
        assert_eq!(err.code(), "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn optional_without_credentials_is_none() {
        let auth = Authenticator::new(&auth_config(AuthMode::Optional, false, false), Some(Arc::new(AlwaysOk)));
        let result = auth.authenticate(&HeaderMap::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn verifier_is_used_when_present() {
        let auth = Authenticator::new(&auth_config(AuthMode::Required, false, false), Some(Arc::new(AlwaysOk)));
        let identity = auth.authenticate(&bearer_headers("abc")).await.unwrap().unwrap();
        assert_eq!(identity.user_id, "verified:abc");
    }

    #[tokio::test]
    async fn rejected_token_is_invalid_token_error() {
        let auth = Authenticator::new(&auth_config(AuthMode::Required, false, false), Some(Arc::new(AlwaysRejects)));
        let err = auth.authenticate(&bearer_headers("abc")).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn snippet_headers_take_priority_over_bearer() {
        let mut headers = bearer_headers("abc");
        headers.insert(HeaderName::from_static("x-snippet-auth-valid"), HeaderValue::from_static("true"));
        headers.insert(HeaderName::from_static("x-snippet-user-id"), HeaderValue::from_static("snippet-user"));
        let auth = Authenticator::new(&auth_config(AuthMode::Required, true, false), Some(Arc::new(AlwaysOk)));
        let identity = auth.authenticate(&headers).await.unwrap().unwrap();
        assert_eq!(identity.user_id, "snippet-user");
    }

    #[derive(Serialize)]
    struct Claims<'a> {
        sub: &'a str,
    }

    #[tokio::test]
    async fn trust_unverified_decodes_without_a_verifier() {
        let token = encode(&JwtHeader::default(), &Claims { sub: "u9" }, &EncodingKey::from_secret(b"anything")).unwrap();
        let auth = Authenticator::new(&auth_config(AuthMode::Required, false, true), None);
        let identity = auth.authenticate(&bearer_headers(&token)).await.unwrap().unwrap();
        assert_eq!(identity.user_id, "u9");
    }

    #[tokio::test]
    async fn no_verifier_and_no_trust_unverified_is_invalid_token() {
        let auth = Authenticator::new(&auth_config(AuthMode::Required, false, false), None);
        let err = auth.authenticate(&bearer_headers("abc")).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_TOKEN");
    }
}
