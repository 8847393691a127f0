use crate::middleware::auth::AuthClaims;
use axum::{Json, response::IntoResponse};
use serde_json::json;

/// GET /health (and the root route when no OAuth code is present).
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "message": "Training Sessions API is running",
    }))
}

/// GET /api/me -> echo the identity bound into the presented bearer token.
pub async fn me(AuthClaims(claims): AuthClaims) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "user": {
            "id": claims.sub,
            "username": claims.username,
            "email": claims.email,
            "provider": claims.provider,
        },
    }))
}
