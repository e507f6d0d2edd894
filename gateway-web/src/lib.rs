//! # gateway-web — the gateway's sole `axum` re-export surface
//!
//! Every other crate that needs a router, an extractor, or a response type
//! goes through here rather than depending on `axum` directly, mirroring
//! `r2e-core::http`'s re-export module. Keeps the framework version pinned
//! to one place in the workspace.

pub use axum::extract::{ConnectInfo, DefaultBodyLimit, FromRef, FromRequestParts, MatchedPath, OriginalUri, Path, Query, State};
pub use axum::http::{
    request::Parts,
    HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri,
    header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, HOST, LOCATION, ORIGIN, REFERER, SET_COOKIE, USER_AGENT},
};
pub use axum::middleware::{from_fn, from_fn_with_state, Next};
pub use axum::response::{Html, IntoResponse, Redirect, Response};
pub use axum::routing::{delete, get, patch, post, put};
pub use axum::{body::Body, extract::Request, Extension, Json, Router};
pub use bytes::Bytes;
