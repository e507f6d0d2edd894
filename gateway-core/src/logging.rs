use std::sync::Once;

static INIT: Once = Once::new();

/// Install a `tracing-subscriber` env-filter subscriber once per process,
/// mirroring `r2e_core::layers::init_tracing`. Safe to call from multiple
/// call sites (tests, multiple `GatewayBuilder`s in one binary).
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}

/// Emit the one-line `trustUnverified` warning. The gateway logs this once
/// per distinct token value the first time its claims are decoded without
/// signature verification.
pub fn warn_trust_unverified_once(token_fingerprint: &str) {
    tracing::warn!(
        token = token_fingerprint,
        "SECURITY WARNING: trustUnverified is enabled; decoding JWT claims without verifying the signature"
    );
}
