//! Resolves a bearer credential into a fully-flattened [`Principal`].

use crate::claims::IdentityClaims;
use crate::error::AuthError;
use gateway_types::ids::{ ProjectId, UserId };
use gateway_types::{ Principal, Role };
use jsonwebtoken::{ decode, Algorithm, DecodingKey, Validation };
use std::collections::BTreeSet;

/// Verifies identity-provider-signed credentials and flattens their group
/// claims into a [`Principal`].
///
/// Built once at startup from the identity provider's signing key
/// ([`gateway_config::GatewaySettings::identity_provider`]); holds no
/// per-request state, so a [`Principal`] is rebuilt from scratch on every
/// call to [`Self::resolve`] rather than cached — a revocation upstream
/// takes effect on the very next request.
#[ derive( Debug ) ]
pub struct IdentityResolver
{
  decoding_key: DecodingKey,
  validation: Validation,
}

impl IdentityResolver
{
  /// Build a resolver from the identity provider's public signing key.
  #[must_use]
  pub fn from_pem( public_key_pem: &[ u8 ], algorithm: Algorithm ) -> Self
  {
    let decoding_key = DecodingKey::from_rsa_pem( public_key_pem )
    .or_else( | _ | DecodingKey::from_ec_pem( public_key_pem ) )
    .unwrap_or_else( | _ | DecodingKey::from_secret( public_key_pem ) );

    let mut validation = Validation::new( algorithm );
    validation.validate_exp = true;

    Self { decoding_key, validation }
  }

  /// Resolve the `Authorization` header value into a verified [`Principal`].
  ///
  /// # Errors
  ///
  /// Returns [`AuthError`] for any absent, malformed, unsigned, expired, or
  /// unparseable-subject credential.
  pub fn resolve( &self, authorization_header: Option< &str > ) -> Result< Principal, AuthError >
  {
    let header = authorization_header.ok_or( AuthError::MissingCredential )?;
    let token = header.strip_prefix( "Bearer " ).ok_or( AuthError::MalformedCredential )?;

    if token.trim().is_empty()
    {
      return Err( AuthError::MalformedCredential );
    }

    let claims = self.verify( token )?;

    let user_id = UserId::parse( &claims.sub ).map_err( | _ | AuthError::UnknownSubject )?;
    let ( projects, roles ) = flatten_groups( &claims.groups );

    Ok( Principal
    {
      user_id,
      email: claims.email,
      groups: claims.groups.into_iter().collect(),
      projects,
      roles,
    } )
  }

  fn verify( &self, token: &str ) -> Result< IdentityClaims, AuthError >
  {
    use jsonwebtoken::errors::ErrorKind;

    decode::< IdentityClaims >( token, &self.decoding_key, &self.validation )
    .map( | data | data.claims )
    .map_err( | error | match error.kind()
    {
      ErrorKind::ExpiredSignature => AuthError::Expired,
      ErrorKind::InvalidSignature | ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => AuthError::SignatureInvalid,
      _ => AuthError::MalformedCredential,
    } )
  }
}

/// Flattens group claims into project access and derived roles.
///
/// Convention: a group of the form `proj_<uuid>` grants `Developer` access
/// to that project; `proj_<uuid>:manager` grants the same project access
/// plus the process-wide `Manager` role. Every resolved principal is at
/// least a `Developer`. Unrecognized groups are ignored rather than
/// rejected, so the identity provider can carry unrelated groups.
fn flatten_groups( groups: &[ String ] ) -> ( BTreeSet< ProjectId >, BTreeSet< Role > )
{
  let mut projects = BTreeSet::new();
  let mut roles: BTreeSet< Role > = [ Role::Developer ].into_iter().collect();

  for group in groups
  {
    let ( project_part, is_manager ) = match group.strip_suffix( ":manager" )
    {
      Some( stripped ) => ( stripped, true ),
      None => ( group.as_str(), false ),
    };

    if let Ok( project_id ) = ProjectId::parse( project_part )
    {
      projects.insert( project_id );
      if is_manager
      {
        roles.insert( Role::Manager );
      }
    }
  }

  ( projects, roles )
}

#[ cfg( test ) ]
mod tests
{
  use super::*;
  use gateway_types::ids::ProjectId as PId;
  use jsonwebtoken::{ encode, EncodingKey, Header };

  fn resolver_with_secret( secret: &str ) -> IdentityResolver
  {
    let mut validation = Validation::new( Algorithm::HS256 );
    validation.validate_exp = true;
    IdentityResolver
    {
      decoding_key: DecodingKey::from_secret( secret.as_bytes() ),
      validation,
    }
  }

  fn token_for( claims: &IdentityClaims, secret: &str ) -> String
  {
    encode( &Header::new( Algorithm::HS256 ), claims, &EncodingKey::from_secret( secret.as_bytes() ) ).unwrap()
  }

  #[ test ]
  fn missing_header_is_missing_credential()
  {
    let resolver = resolver_with_secret( "s" );
    assert_eq!( resolver.resolve( None ).unwrap_err(), AuthError::MissingCredential );
  }

  #[ test ]
  fn header_without_bearer_prefix_is_malformed()
  {
    let resolver = resolver_with_secret( "s" );
    assert_eq!( resolver.resolve( Some( "Basic abc" ) ).unwrap_err(), AuthError::MalformedCredential );
  }

  #[ test ]
  fn valid_token_resolves_to_principal_with_flattened_groups()
  {
    let project = PId::generate();
    let claims = IdentityClaims
    {
      sub: UserId::generate().to_string(),
      email: "dev@example.com".into(),
      groups: vec![ format!( "{project}:manager" ) ],
      iat: chrono::Utc::now().timestamp(),
      exp: chrono::Utc::now().timestamp() + 3600,
    };
    let token = token_for( &claims, "s" );

    let resolver = resolver_with_secret( "s" );
    let principal = resolver.resolve( Some( &format!( "Bearer {token}" ) ) ).unwrap();

    assert!( principal.can_access_project( &project ) );
    assert!( principal.is_manager() );
  }

  #[ test ]
  fn expired_token_is_rejected()
  {
    let claims = IdentityClaims
    {
      sub: UserId::generate().to_string(),
      email: "dev@example.com".into(),
      groups: vec![],
      iat: chrono::Utc::now().timestamp() - 7200,
      exp: chrono::Utc::now().timestamp() - 3600,
    };
    let token = token_for( &claims, "s" );

    let resolver = resolver_with_secret( "s" );
    assert_eq!( resolver.resolve( Some( &format!( "Bearer {token}" ) ) ).unwrap_err(), AuthError::Expired );
  }

  #[ test ]
  fn wrong_signing_secret_is_signature_invalid()
  {
    let claims = IdentityClaims
    {
      sub: UserId::generate().to_string(),
      email: "dev@example.com".into(),
      groups: vec![],
      iat: chrono::Utc::now().timestamp(),
      exp: chrono::Utc::now().timestamp() + 3600,
    };
    let token = token_for( &claims, "right-secret" );

    let resolver = resolver_with_secret( "wrong-secret" );
    assert_eq!( resolver.resolve( Some( &format!( "Bearer {token}" ) ) ).unwrap_err(), AuthError::SignatureInvalid );
  }

  #[ test ]
  fn malformed_subject_is_unknown_subject()
  {
    let claims = IdentityClaims
    {
      sub: "not-a-valid-id".into(),
      email: "dev@example.com".into(),
      groups: vec![],
      iat: chrono::Utc::now().timestamp(),
      exp: chrono::Utc::now().timestamp() + 3600,
    };
    let token = token_for( &claims, "s" );

    let resolver = resolver_with_secret( "s" );
    assert_eq!( resolver.resolve( Some( &format!( "Bearer {token}" ) ) ).unwrap_err(), AuthError::UnknownSubject );
  }
}
