//! Provider credential storage. Never echoes a raw secret back to a caller.

use crate::error::ApiError;
use crate::extractor::AuthenticatedPrincipal;
use crate::state::ApiState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use gateway_reliability::ModelBackend;
use gateway_types::ids::ProjectId;
use gateway_types::GatewayError;
use gateway_vault::store::{ SecretStore, StoredSecret };
use serde::{ Deserialize, Serialize };

/// The master key version new rows are written under. Rotation would bump
/// this and re-encrypt existing rows; not implemented here.
const CURRENT_KEY_VERSION: u32 = 1;

#[ derive( Debug, Deserialize ) ]
pub struct StoreSecretRequest
{
  pub project_id: ProjectId,
  pub service_name: String,
  pub secret_value: String,
}

#[ derive( Debug, Serialize ) ]
pub struct StoreSecretResponse
{
  pub secret_id: gateway_types::ids::SecretId,
  pub auc_id: ProjectId,
  pub service_name: String,
  pub created_at: chrono::DateTime< Utc >,
}

/// `POST /api/v1/vault/secrets`
///
/// # Errors
///
/// Returns [`ApiError`] if the caller cannot access the named project, or if
/// encryption fails.
pub async fn store_secret< S, B >(
  State( state ): State< ApiState< S, B > >,
  AuthenticatedPrincipal( principal ): AuthenticatedPrincipal,
  Json( request ): Json< StoreSecretRequest >,
) -> Result< impl IntoResponse, ApiError >
where
  S: SecretStore + 'static,
  B: ModelBackend + 'static,
{
  if !principal.can_access_project( &request.project_id )
  {
    return Err( GatewayError::Forbidden( "no access to this project".into() ).into() );
  }

  let encrypted = state.crypto.encrypt( &request.secret_value )
  .map_err( | error | GatewayError::Internal( error.to_string() ) )?;

  let stored = StoredSecret::from_encrypted( &encrypted, CURRENT_KEY_VERSION );
  state.secret_store.put( &request.project_id, &request.service_name, stored );

  let response = StoreSecretResponse
  {
    secret_id: gateway_types::ids::SecretId::generate(),
    auc_id: request.project_id,
    service_name: request.service_name,
    created_at: Utc::now(),
  };

  Ok( ( StatusCode::CREATED, Json( response ) ) )
}
