//! Cross-origin headers
//!
//! Any origin may call any verb of the resource. The headers go on every
//! response, error responses included, so browsers can read failures too.

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::Response,
};
use std::sync::Arc;

use crate::gateway::GatewayState;

pub const ALLOWED_ORIGIN: &str = "*";
pub const ALLOWED_METHODS: &str = "GET, POST, PATCH, DELETE, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

pub async fn apply_cors_headers(
    State(state): State<Arc<GatewayState>>,
    mut response: Response,
) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOWED_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from(state.config.cors_max_age_secs),
    );
    response
}
