//! # gateway-core — ambient runtime types for the gateway
//!
//! The pure, dependency-light base crate: the tagged [`Value`] union every
//! other crate in the workspace builds documents and filters out of, the
//! [`AppError`](error::AppError) taxonomy, the per-request
//! [`RequestContext`], and [`GatewayConfig`] loading.
//!
//! Nothing in this crate does I/O beyond reading configuration at startup.

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod value;

pub use config::GatewayConfig;
pub use context::RequestContext;
pub use error::{AppError, FieldError};
pub use value::Value;

pub mod prelude {
    pub use crate::{AppError, FieldError, GatewayConfig, RequestContext, Value};
}
