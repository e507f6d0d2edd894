//! # gateway — the facade crate
//!
//! Wires `gateway-schema`, `gateway-store`, `gateway-auth`, `gateway-http`
//! and `gateway-mcp` into one `axum::Router` behind a single builder, the
//! way the teacher's `r2e` crate aggregates its sub-crates behind feature
//! flags and a `prelude` module.
//!
//! ```ignore
//! let router = GatewayBuilder::new(config)
//!     .init_tracing()
//!     .build()?;
//! ```

mod builder;
mod error;
mod health;
mod secure_headers;

pub use builder::GatewayBuilder;
pub use error::GatewayError;
pub use gateway_core::logging::init_tracing;
pub use health::healthz_handler;

/// Re-exports for binaries that assemble a gateway without depending on
/// every sub-crate individually, mirroring `r2e::prelude`.
pub mod prelude {
    pub use crate::{GatewayBuilder, GatewayError};
    pub use gateway_core::GatewayConfig;
    pub use gateway_http::GatewayState;
    pub use gateway_mcp::{Tool, ToolHandler, ToolKind};
    pub use gateway_web::Router;
}
