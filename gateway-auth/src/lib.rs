//! # gateway-auth — bearer/JWT/trusted-header authentication
//!
//! Three ways a request can carry an identity, tried in this order by
//! [`Authenticator::authenticate`]:
//!
//! 1. Trusted snippet headers (`x-snippet-*`), when `auth.trustSnippets`
//!    is on — an upstream has already verified the caller and is
//!    handing the gateway its conclusion.
//! 2. A bearer token checked against a real [`AuthVerifier`].
//! 3. A bearer token whose claims are decoded without checking its
//!    signature, when `auth.trustUnverified` is on and no verifier is
//!    configured — logged once per token fingerprint.
//!
//! None of this crate implements signature verification itself; that's
//! the job of whatever `AuthVerifier` a deployment plugs in.

pub mod authenticator;
pub mod bearer;
pub mod extractor;
pub mod identity;
pub mod snippet;
pub mod unverified;
pub mod verifier;

pub use authenticator::Authenticator;
pub use extractor::{AuthenticatedUser, MaybeAuthenticatedUser};
pub use identity::Identity;
pub use verifier::{AuthVerifier, VerifyError};
