//! Extracts a verified [`Principal`] from the `Authorization` header.

use crate::state::ApiState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gateway_reliability::ModelBackend;
use gateway_types::Principal;
use gateway_vault::store::SecretStore;

/// Wrapper so handlers can take `AuthenticatedPrincipal(principal)` as an argument.
#[ derive( Debug ) ]
pub struct AuthenticatedPrincipal( pub Principal );

#[ axum::async_trait ]
impl< S, B > FromRequestParts< ApiState< S, B > > for AuthenticatedPrincipal
where
  S: SecretStore + 'static,
  B: ModelBackend + 'static,
{
  type Rejection = crate::error::ApiError;

  async fn from_request_parts( parts: &mut Parts, state: &ApiState< S, B > ) -> Result< Self, Self::Rejection >
  {
    let header = parts.headers
    .get( axum::http::header::AUTHORIZATION )
    .and_then( | value | value.to_str().ok() );

    let principal = state.identity.resolve( header ).map_err( gateway_identity::AuthError::into_gateway_error )?;

    Ok( Self( principal ) )
  }
}
