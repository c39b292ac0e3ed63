//! Liveness endpoint.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[ derive( Debug, Serialize ) ]
struct HealthResponse
{
  status: &'static str,
}

/// `GET /api/v1/health`
#[must_use]
pub async fn health() -> impl IntoResponse
{
  ( StatusCode::OK, Json( HealthResponse { status: "healthy" } ) )
}
