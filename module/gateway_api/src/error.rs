//! Maps [`GatewayError`] onto HTTP status codes and the envelope every
//! failure response shares.

use axum::http::StatusCode;
use axum::response::{ IntoResponse, Response };
use axum::Json;
use gateway_types::GatewayError;
use serde::Serialize;

/// The only shape an error response ever takes: a status code is the
/// contract, this string is informational.
#[ derive( Debug, Serialize ) ]
pub struct ErrorEnvelope
{
  detail: String,
}

/// Newtype so `gateway_api` can implement [`IntoResponse`] for a foreign error type.
#[ derive( Debug ) ]
pub struct ApiError( pub GatewayError );

impl From< GatewayError > for ApiError
{
  fn from( error: GatewayError ) -> Self
  {
    Self( error )
  }
}

impl From< gateway_lock::LockError > for ApiError
{
  fn from( error: gateway_lock::LockError ) -> Self
  {
    let mapped = match error
    {
      gateway_lock::LockError::NotFound => GatewayError::NotFound( error.to_string() ),
      gateway_lock::LockError::LockConflict { .. } => GatewayError::LockConflict( error.to_string() ),
      gateway_lock::LockError::Forbidden => GatewayError::Forbidden( error.to_string() ),
      gateway_lock::LockError::Conflict => GatewayError::Conflict( error.to_string() ),
      gateway_lock::LockError::Storage( .. ) => GatewayError::Internal( error.to_string() ),
    };
    Self( mapped )
  }
}

impl IntoResponse for ApiError
{
  fn into_response( self ) -> Response
  {
    let status = match &self.0
    {
      GatewayError::AuthMissing | GatewayError::AuthInvalid( .. ) => StatusCode::UNAUTHORIZED,
      GatewayError::Forbidden( .. ) => StatusCode::FORBIDDEN,
      GatewayError::NotFound( .. ) => StatusCode::NOT_FOUND,
      GatewayError::ValidationFailed( .. ) => StatusCode::BAD_REQUEST,
      GatewayError::BudgetExceeded( .. ) => StatusCode::PAYMENT_REQUIRED,
      GatewayError::LockConflict( .. ) => StatusCode::LOCKED,
      GatewayError::Conflict( .. ) => StatusCode::CONFLICT,
      GatewayError::Unavailable( .. ) => StatusCode::SERVICE_UNAVAILABLE,
      GatewayError::Upstream( .. ) => StatusCode::BAD_GATEWAY,
      GatewayError::ConfigurationError( .. ) => StatusCode::INTERNAL_SERVER_ERROR,
      GatewayError::Internal( .. ) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    tracing::warn!( category = self.0.category(), "request failed" );

    ( status, Json( ErrorEnvelope { detail: self.0.to_string() } ) ).into_response()
  }
}
