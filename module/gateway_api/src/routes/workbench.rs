//! Workbench draft endpoints: pessimistic locking and the review state machine.

use crate::error::ApiError;
use crate::extractor::AuthenticatedPrincipal;
use crate::state::ApiState;
use axum::extract::{ Path, Query, State };
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use gateway_lock::{ Draft, LockMode, TransitionVerb };
use gateway_reliability::ModelBackend;
use gateway_types::ids::{ DraftId, ProjectId };
use gateway_vault::store::SecretStore;
use serde::{ Deserialize, Serialize };
use serde_json::Value;

#[ derive( Debug, Serialize ) ]
pub struct DraftResponse
{
  pub draft_id: DraftId,
  pub project_id: ProjectId,
  pub owner_id: gateway_types::ids::UserId,
  pub title: String,
  pub status: &'static str,
  pub content: Value,
  pub runtime_fingerprint: Option< String >,
  pub deleted: bool,
  pub created_at: chrono::DateTime< Utc >,
  pub updated_at: chrono::DateTime< Utc >,
}

impl From< Draft > for DraftResponse
{
  fn from( draft: Draft ) -> Self
  {
    Self
    {
      draft_id: draft.draft_id,
      project_id: draft.project_id,
      owner_id: draft.owner_id,
      title: draft.title,
      status: draft.status.as_str(),
      content: draft.content,
      runtime_fingerprint: draft.runtime_fingerprint,
      deleted: draft.deleted,
      created_at: draft.created_at,
      updated_at: draft.updated_at,
    }
  }
}

#[ derive( Debug, Serialize ) ]
pub struct DraftWithMode
{
  #[ serde( flatten ) ]
  pub draft: DraftResponse,
  pub mode: &'static str,
  pub holder: Option< gateway_types::ids::UserId >,
}

#[ derive( Debug, Deserialize ) ]
pub struct ListDraftsQuery
{
  pub auc_id: ProjectId,
}

/// `GET /api/v1/workbench/drafts?auc_id=`
///
/// # Errors
///
/// Returns [`ApiError`] if the caller cannot access the named project.
pub async fn list_drafts< S, B >(
  State( state ): State< ApiState< S, B > >,
  AuthenticatedPrincipal( principal ): AuthenticatedPrincipal,
  Query( query ): Query< ListDraftsQuery >,
) -> Result< impl IntoResponse, ApiError >
where
  S: SecretStore + 'static,
  B: ModelBackend + 'static,
{
  if !principal.can_access_project( &query.auc_id )
  {
    return Err( gateway_types::GatewayError::Forbidden( "no access to this project".into() ).into() );
  }

  let drafts = state.locks.list_drafts( &query.auc_id ).await?;
  let response: Vec< DraftResponse > = drafts.into_iter().filter( | draft | !draft.deleted ).map( DraftResponse::from ).collect();
  Ok( ( StatusCode::OK, Json( response ) ) )
}

#[ derive( Debug, Deserialize ) ]
pub struct CreateDraftRequest
{
  pub project_id: ProjectId,
  pub title: String,
  pub content: Value,
}

/// `POST /api/v1/workbench/drafts`
///
/// # Errors
///
/// Returns [`ApiError`] if the caller cannot access the named project.
pub async fn create_draft< S, B >(
  State( state ): State< ApiState< S, B > >,
  AuthenticatedPrincipal( principal ): AuthenticatedPrincipal,
  Json( request ): Json< CreateDraftRequest >,
) -> Result< impl IntoResponse, ApiError >
where
  S: SecretStore + 'static,
  B: ModelBackend + 'static,
{
  if !principal.can_access_project( &request.project_id )
  {
    return Err( gateway_types::GatewayError::Forbidden( "no access to this project".into() ).into() );
  }

  let draft_id = state.locks.create_draft( request.project_id, principal.user_id.clone(), request.title, request.content, Utc::now() ).await?;
  Ok( ( StatusCode::CREATED, Json( serde_json::json!( { "draft_id": draft_id } ) ) ) )
}

fn mode_str( mode: LockMode ) -> &'static str
{
  match mode
  {
    LockMode::Edit => "EDIT",
    LockMode::SafeView => "SAFE_VIEW",
  }
}

/// `GET /api/v1/workbench/drafts/{id}`
///
/// # Errors
///
/// Returns [`ApiError`] if the draft does not exist or its lock is held and
/// the caller is not a manager.
pub async fn acquire_draft< S, B >(
  State( state ): State< ApiState< S, B > >,
  AuthenticatedPrincipal( principal ): AuthenticatedPrincipal,
  Path( draft_id ): Path< DraftId >,
) -> Result< impl IntoResponse, ApiError >
where
  S: SecretStore + 'static,
  B: ModelBackend + 'static,
{
  let now = Utc::now();
  let grant = state.locks.acquire( &draft_id, &principal, now ).await?;
  let draft = state.locks.get_draft( &draft_id ).await?;

  let response = DraftWithMode
  {
    draft: DraftResponse::from( draft ),
    mode: mode_str( grant.mode ),
    holder: grant.holder,
  };

  Ok( ( StatusCode::OK, Json( response ) ) )
}

#[ derive( Debug, Deserialize ) ]
pub struct UpdateDraftRequest
{
  pub content: Value,
}

/// `PUT /api/v1/workbench/drafts/{id}`
///
/// # Errors
///
/// Returns [`ApiError`] if the caller does not hold the draft's lock.
pub async fn update_draft< S, B >(
  State( state ): State< ApiState< S, B > >,
  AuthenticatedPrincipal( principal ): AuthenticatedPrincipal,
  Path( draft_id ): Path< DraftId >,
  Json( request ): Json< UpdateDraftRequest >,
) -> Result< impl IntoResponse, ApiError >
where
  S: SecretStore + 'static,
  B: ModelBackend + 'static,
{
  let now = Utc::now();
  state.locks.update( &draft_id, &principal, request.content, now ).await?;
  Ok( StatusCode::OK )
}

/// `POST /api/v1/workbench/drafts/{id}/lock`
///
/// # Errors
///
/// Returns [`ApiError`] if the caller does not currently hold the lock.
pub async fn heartbeat< S, B >(
  State( state ): State< ApiState< S, B > >,
  AuthenticatedPrincipal( principal ): AuthenticatedPrincipal,
  Path( draft_id ): Path< DraftId >,
) -> Result< impl IntoResponse, ApiError >
where
  S: SecretStore + 'static,
  B: ModelBackend + 'static,
{
  let now = Utc::now();
  state.locks.heartbeat( &draft_id, &principal, now ).await?;
  Ok( StatusCode::OK )
}

/// `POST /api/v1/workbench/drafts/{id}/submit`
///
/// # Errors
///
/// Returns [`ApiError`] if the caller is not the draft's owner or the draft
/// is not currently in the `Draft` status.
pub async fn submit< S, B >(
  state: State< ApiState< S, B > >,
  principal: AuthenticatedPrincipal,
  path: Path< DraftId >,
) -> Result< impl IntoResponse, ApiError >
where
  S: SecretStore + 'static,
  B: ModelBackend + 'static,
{
  transition( state, principal, path, TransitionVerb::Submit ).await
}

/// `POST /api/v1/workbench/drafts/{id}/approve`
///
/// # Errors
///
/// Returns [`ApiError`] if the caller is not a manager or the draft is not
/// currently `Pending`.
pub async fn approve< S, B >(
  state: State< ApiState< S, B > >,
  principal: AuthenticatedPrincipal,
  path: Path< DraftId >,
) -> Result< impl IntoResponse, ApiError >
where
  S: SecretStore + 'static,
  B: ModelBackend + 'static,
{
  transition( state, principal, path, TransitionVerb::Approve ).await
}

/// `POST /api/v1/workbench/drafts/{id}/reject`
///
/// # Errors
///
/// Returns [`ApiError`] if the caller is not a manager or the draft is not
/// currently `Pending`.
pub async fn reject< S, B >(
  state: State< ApiState< S, B > >,
  principal: AuthenticatedPrincipal,
  path: Path< DraftId >,
) -> Result< impl IntoResponse, ApiError >
where
  S: SecretStore + 'static,
  B: ModelBackend + 'static,
{
  transition( state, principal, path, TransitionVerb::Reject ).await
}

async fn transition< S, B >(
  State( state ): State< ApiState< S, B > >,
  AuthenticatedPrincipal( principal ): AuthenticatedPrincipal,
  Path( draft_id ): Path< DraftId >,
  verb: TransitionVerb,
) -> Result< impl IntoResponse, ApiError >
where
  S: SecretStore + 'static,
  B: ModelBackend + 'static,
{
  state.locks.transition( &draft_id, &principal, verb, Utc::now() ).await?;
  Ok( StatusCode::OK )
}
