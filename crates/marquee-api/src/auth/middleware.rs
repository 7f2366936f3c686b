use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use marquee_core::AppError;
use subtle::ConstantTimeEq;

use crate::error::HttpAppError;

const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Clone)]
pub struct AuthState {
    pub master_api_key: String,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Credential from `Authorization: Bearer` or, failing that, `X-API-Key`
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(auth) = headers.get("Authorization").and_then(|h| h.to_str().ok()) {
        return auth.strip_prefix("Bearer ").map(str::trim);
    }
    headers
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
}

/// Gate admin routes on the master API key
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(key) = presented_key(request.headers()) else {
        return HttpAppError(AppError::Unauthorized(
            "Missing credentials: send 'Authorization: Bearer <key>' or 'X-API-Key'".to_string(),
        ))
        .into_response();
    };

    if !secure_compare(key, &auth_state.master_api_key) {
        tracing::warn!(path = %request.uri().path(), "Rejected request with invalid API key");
        return HttpAppError(AppError::Unauthorized("Invalid API key".to_string())).into_response();
    }

    next.run(request).await
}
