//! Failure modes for credential resolution.

/// Why a credential failed to resolve to a [`gateway_types::Principal`].
#[ derive( Debug, Clone, PartialEq, Eq, thiserror::Error ) ]
pub enum AuthError
{
  /// No credential was presented at all.
  #[ error( "missing authentication credential" ) ]
  MissingCredential,

  /// The credential was not a well-formed bearer JWT.
  #[ error( "malformed authentication credential" ) ]
  MalformedCredential,

  /// Signature verification against the identity provider's signing key failed.
  #[ error( "authentication credential signature invalid" ) ]
  SignatureInvalid,

  /// The token's `exp` claim is in the past.
  #[ error( "authentication credential expired" ) ]
  Expired,

  /// The token verified but names a subject this resolver cannot map to a user.
  #[ error( "authentication credential names an unknown subject" ) ]
  UnknownSubject,
}

impl AuthError
{
  /// Maps every variant onto the gateway's categorized error, always as
  /// `AuthInvalid` except for the missing-credential case.
  #[must_use]
  pub fn into_gateway_error( self ) -> gateway_types::GatewayError
  {
    match self
    {
      Self::MissingCredential => gateway_types::GatewayError::AuthMissing,
      other => gateway_types::GatewayError::AuthInvalid( other.to_string() ),
    }
  }
}
