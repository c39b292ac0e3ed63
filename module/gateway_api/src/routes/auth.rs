//! Device-code sign-in. The identity provider itself is an external
//! collaborator (`gateway_identity` only verifies credentials it did not
//! issue) — these handlers are a thin, intentionally mocked front door so a
//! developer client has something to poll in a local or demo deployment.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gateway_types::ids::UserId;
use serde::{ Deserialize, Serialize };

#[ derive( Debug, Serialize ) ]
pub( crate ) struct DeviceCodeResponse
{
  device_code: String,
  user_code: String,
  verification_uri: String,
  expires_in: u64,
  interval: u64,
}

/// `POST /api/v1/auth/device-code`
#[must_use]
pub async fn device_code() -> impl IntoResponse
{
  let response = DeviceCodeResponse
  {
    device_code: UserId::generate().to_string(),
    user_code: "ABCD-EFGH".into(),
    verification_uri: "https://example.invalid/activate".into(),
    expires_in: 600,
    interval: 5,
  };

  ( StatusCode::OK, Json( response ) )
}

#[ derive( Debug, Deserialize ) ]
pub( crate ) struct TokenPollRequest
{
  #[ allow( dead_code ) ]
  device_code: String,
}

#[ derive( Debug, Serialize ) ]
#[ serde( untagged ) ]
pub( crate ) enum TokenPollResponse
{
  Pending { error: &'static str },
}

/// `POST /api/v1/auth/token`
///
/// This mock never completes the device flow: it always reports
/// `authorization_pending`, since finishing real SSO sign-in is delegated to
/// the external identity provider.
#[must_use]
pub async fn token( Json( _request ): Json< TokenPollRequest > ) -> impl IntoResponse
{
  ( StatusCode::BAD_REQUEST, Json( TokenPollResponse::Pending { error: "authorization_pending" } ) )
}
