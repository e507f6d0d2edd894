//! # gateway-http — request router, tenant resolution, response envelope
//!
//! Mounts the canonical REST surface (§4.6) for every model in a parsed
//! schema onto one `axum::Router`, resolves the requesting tenant from
//! the path or host, and shapes every response through the envelope/link
//! builders (§4.8). Built on `gateway-web`, the workspace's sole `axum`
//! re-export surface.

pub mod envelope;
pub mod links;
pub mod mcp;
pub mod query;
pub mod router;
pub mod tenant;

pub use envelope::{error_envelope, success_envelope, ApiInfo};
pub use links::{build_error_links, build_links, build_page_links, ErrorLinkContext};
pub use mcp::mcp_handler;
pub use query::{parse_page_params, parse_sort_param, PageParams};
pub use router::{build_router, GatewayState};
pub use tenant::{extract_tenant_from_host, extract_tenant_from_path};
