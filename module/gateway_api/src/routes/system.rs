//! Compliance attestation: a checksum and allowlist snapshot for auditors.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use sha2::{ Digest, Sha256 };

#[ derive( Debug, Serialize ) ]
struct ComplianceResponse
{
  checksum_sha256: String,
  allowlists: AllowedProviders,
}

#[ derive( Debug, Serialize ) ]
struct AllowedProviders
{
  model_providers: Vec< &'static str >,
}

/// `GET /api/v1/system/compliance`
///
/// The checksum attests to the running build, not the request: it is a hash
/// of the crate's own name and version, stable across instances of the same
/// deployment and changing only on a release.
#[must_use]
pub async fn compliance() -> impl IntoResponse
{
  let mut hasher = Sha256::new();
  hasher.update( env!( "CARGO_PKG_NAME" ).as_bytes() );
  hasher.update( env!( "CARGO_PKG_VERSION" ).as_bytes() );
  let checksum_sha256 = hex::encode( hasher.finalize() );

  let response = ComplianceResponse
  {
    checksum_sha256,
    allowlists: AllowedProviders { model_providers: vec![ "openai", "anthropic" ] },
  };

  ( StatusCode::OK, Json( response ) )
}
