//! The governance pipeline's one HTTP door.

use crate::error::ApiError;
use crate::extractor::AuthenticatedPrincipal;
use crate::state::ApiState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gateway_reliability::ModelBackend;
use gateway_types::ids::ProjectId;
use gateway_vault::store::SecretStore;
use serde::Deserialize;
use serde_json::Value;

#[ derive( Debug, Deserialize ) ]
pub struct ChatCompletionRequest
{
  pub project_id: ProjectId,
  pub model: String,
  pub messages: Vec< Value >,
  #[ serde( default ) ]
  pub estimated_cost_hint: Option< u64 >,
}

/// `POST /api/v1/chat/completions`
///
/// # Errors
///
/// Returns whatever categorized failure [`gateway_pipeline::GovernancePipeline::chat`] produces.
pub async fn chat_completions< S, B >(
  State( state ): State< ApiState< S, B > >,
  AuthenticatedPrincipal( principal ): AuthenticatedPrincipal,
  Json( request ): Json< ChatCompletionRequest >,
) -> Result< impl IntoResponse, ApiError >
where
  S: SecretStore + 'static,
  B: ModelBackend + 'static,
{
  let response = state.pipeline
  .chat( &principal, &request.project_id, &request.model, request.messages, request.estimated_cost_hint )
  .await?;

  Ok( ( StatusCode::OK, Json( response ) ) )
}
