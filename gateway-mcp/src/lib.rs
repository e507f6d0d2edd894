//! # gateway-mcp — tool registry aggregation and the `/mcp` JSON-RPC surface
//!
//! A process-wide `toolName → Tool` mapping (§4.7) aggregated from three
//! sources — explicit MCP config tools, per-model derived tools, and
//! function-convention tools — plus the pure request/response logic for
//! the single `tools/list`/`tools/call` JSON-RPC endpoint. Hand-rolled
//! rather than built on a stdio-oriented MCP session crate: the gateway's
//! surface is one stateless HTTP endpoint, closer to `r2e-openapi`'s
//! schema-registry aggregation than to a long-lived protocol session.
//! The actual `axum` route lives in `gateway-http`; this crate has no
//! web-framework dependency at all.

pub mod model_tools;
pub mod registry;
pub mod rpc;
pub mod tool;

pub use model_tools::{model_tools, schema_tools};
pub use registry::ToolRegistry;
pub use rpc::{handle_request, tools_call, tools_list, JsonRpcRequest, RpcOutcome, ToolsCallParams};
pub use tool::{RouteRef, Tool, ToolHandler, ToolKind};
