//! Assembles the gateway's full HTTP surface.

use crate::routes;
use crate::state::ApiState;
use axum::routing::{ get, post };
use axum::Router;
use gateway_reliability::ModelBackend;
use gateway_vault::store::SecretStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the `/api/v1/...` router over the given application state.
#[must_use]
pub fn build< S, B >( state: ApiState< S, B > ) -> Router
where
  S: SecretStore + 'static,
  B: ModelBackend + 'static,
{
  Router::new()
  .route( "/api/v1/health", get( routes::health::health ) )
  .route( "/api/v1/system/compliance", get( routes::system::compliance ) )
  .route( "/api/v1/auth/device-code", post( routes::auth::device_code ) )
  .route( "/api/v1/auth/token", post( routes::auth::token ) )
  .route( "/api/v1/chat/completions", post( routes::chat::chat_completions ) )
  .route( "/api/v1/workbench/drafts", get( routes::workbench::list_drafts ).post( routes::workbench::create_draft ) )
  .route( "/api/v1/workbench/drafts/:id", get( routes::workbench::acquire_draft ).put( routes::workbench::update_draft ) )
  .route( "/api/v1/workbench/drafts/:id/lock", post( routes::workbench::heartbeat ) )
  .route( "/api/v1/workbench/drafts/:id/submit", post( routes::workbench::submit ) )
  .route( "/api/v1/workbench/drafts/:id/approve", post( routes::workbench::approve ) )
  .route( "/api/v1/workbench/drafts/:id/reject", post( routes::workbench::reject ) )
  .route( "/api/v1/vault/secrets", post( routes::vault::store_secret ) )
  .layer( CorsLayer::permissive() )
  .layer( TraceLayer::new_for_http() )
  .with_state( state )
}
