//! Type-safe entity identifiers with validation.
//!
//! All IDs use the underscore-separated format `prefix_uuid`. Each entity type
//! gets its own newtype so the compiler catches accidental mixing (passing a
//! [`DraftId`] where a [`ProjectId`] is expected, for example).
//!
//! # Quick Start
//!
//! ```
//! use gateway_types::UserId;
//!
//! let id = UserId::generate();
//! assert!(id.as_str().starts_with("user_"));
//!
//! let parsed = UserId::parse(id.as_str()).unwrap();
//! assert_eq!(parsed, id);
//! ```

use serde::{ Deserialize, Serialize };
use std::fmt;

/// Entity ID prefixes.
pub mod prefix
{
  pub const USER: &str = "user_";
  pub const PROJECT: &str = "proj_";
  pub const DRAFT: &str = "draft_";
  pub const RESERVATION: &str = "resv_";
  pub const RECORD: &str = "rec_";
  pub const SECRET: &str = "secret_";
}

/// Errors that can occur during ID parsing.
#[ derive( Debug, Clone, PartialEq, Eq, thiserror::Error ) ]
pub enum IdError
{
  /// The ID did not start with the expected prefix for its type.
  #[ error( "invalid prefix: expected '{expected}', found '{found}'" ) ]
  InvalidPrefix
  {
    /// Prefix this ID type requires.
    expected: &'static str,
    /// Prefix actually found on the input.
    found: String,
  },

  /// The prefix was present but no UUID component followed it.
  #[ error( "missing uuid component" ) ]
  MissingUuid,

  /// The UUID component did not match the expected 8-4-4-4-12 hex layout.
  #[ error( "invalid uuid format: '{0}'" ) ]
  InvalidUuid( String ),

  /// The input string was empty.
  #[ error( "empty id string" ) ]
  EmptyId,
}

fn is_valid_uuid( s: &str ) -> bool
{
  if s.len() != 36
  {
    return false;
  }

  let parts: Vec< &str > = s.split( '-' ).collect();
  if parts.len() != 5
  {
    return false;
  }

  let expected_lens = [ 8, 4, 4, 4, 12 ];
  for ( part, &expected_len ) in parts.iter().zip( expected_lens.iter() )
  {
    if part.len() != expected_len
    {
      return false;
    }
    if !part.chars().all( |c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase() )
    {
      return false;
    }
  }

  true
}

macro_rules! define_id
{
  (
    $( #[ $meta:meta ] )*
    $name:ident,
    $prefix:expr,
    $doc:expr
  ) =>
  {
    $( #[ $meta ] )*
    #[ doc = $doc ]
    #[ derive( Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize ) ]
    #[ serde( try_from = "String", into = "String" ) ]
    pub struct $name( String );

    impl $name
    {
      /// Parse an ID from a string, validating its format.
      ///
      /// # Errors
      ///
      /// Returns [`IdError`] if the prefix or UUID component is malformed.
      pub fn parse( s: impl AsRef< str > ) -> Result< Self, IdError >
      {
        let s = s.as_ref();

        if s.is_empty()
        {
          return Err( IdError::EmptyId );
        }

        if !s.starts_with( $prefix )
        {
          return Err( IdError::InvalidPrefix
          {
            expected: $prefix,
            found: s.chars().take( $prefix.len() + 1 ).collect(),
          } );
        }

        let uuid_part = &s[ $prefix.len().. ];
        if uuid_part.is_empty()
        {
          return Err( IdError::MissingUuid );
        }

        if !is_valid_uuid( uuid_part )
        {
          return Err( IdError::InvalidUuid( uuid_part.to_string() ) );
        }

        Ok( Self( s.to_string() ) )
      }

      /// Generate a new random ID.
      #[must_use]
      pub fn generate() -> Self
      {
        Self( format!( "{}{}", $prefix, uuid::Uuid::new_v4() ) )
      }

      /// Return the ID as a string slice.
      #[must_use]
      pub fn as_str( &self ) -> &str
      {
        &self.0
      }

      /// Return the prefix for this ID type.
      #[must_use]
      pub fn prefix() -> &'static str
      {
        $prefix
      }
    }

    impl fmt::Display for $name
    {
      fn fmt( &self, f: &mut fmt::Formatter< '_ > ) -> fmt::Result
      {
        write!( f, "{}", self.0 )
      }
    }

    impl TryFrom< String > for $name
    {
      type Error = IdError;

      fn try_from( value: String ) -> Result< Self, Self::Error >
      {
        Self::parse( value )
      }
    }

    impl From< $name > for String
    {
      fn from( id: $name ) -> Self
      {
        id.0
      }
    }

    impl AsRef< str > for $name
    {
      fn as_ref( &self ) -> &str
      {
        &self.0
      }
    }

    impl std::str::FromStr for $name
    {
      type Err = IdError;

      fn from_str( s: &str ) -> Result< Self, Self::Err >
      {
        Self::parse( s )
      }
    }

    #[ cfg( feature = "test-helpers" ) ]
    impl $name
    {
      /// Build a deterministic ID from a sequence number, for reproducible tests.
      #[must_use]
      pub fn test_fixture( n: u32 ) -> Self
      {
        let uuid = uuid::Uuid::from_u128( n as u128 );
        Self( format!( "{}{}", $prefix, uuid ) )
      }
    }
  };
}

define_id!(
  /// Stable identifier for an authenticated user (the identity provider's subject id).
  UserId,
  prefix::USER,
  "Unique identifier for a user (format: `user_<uuid>`)"
);

define_id!(
  /// Opaque identifier for an authorization scope (the spec's AUC ID).
  ProjectId,
  prefix::PROJECT,
  "Unique identifier for a project / authorization scope (format: `proj_<uuid>`)"
);

define_id!(
  /// Identifier for a workbench draft.
  DraftId,
  prefix::DRAFT,
  "Unique identifier for a workbench draft (format: `draft_<uuid>`)"
);

define_id!(
  /// Identifier for a budget reservation.
  ReservationId,
  prefix::RESERVATION,
  "Unique identifier for a budget reservation (format: `resv_<uuid>`)"
);

define_id!(
  /// Identifier for a telemetry record.
  RecordId,
  prefix::RECORD,
  "Unique identifier for a telemetry record (format: `rec_<uuid>`)"
);

define_id!(
  /// Identifier for a vault secret.
  SecretId,
  prefix::SECRET,
  "Unique identifier for a vault secret (format: `secret_<uuid>`)"
);

#[ cfg( test ) ]
mod tests
{
  use super::*;

  #[ test ]
  fn generate_has_correct_prefix()
  {
    let id = UserId::generate();
    assert!( id.as_str().starts_with( "user_" ) );
  }

  #[ test ]
  fn parse_roundtrips()
  {
    let id = ProjectId::generate();
    let parsed = ProjectId::parse( id.as_str() ).unwrap();
    assert_eq!( id, parsed );
  }

  #[ test ]
  fn parse_rejects_wrong_prefix()
  {
    let result = DraftId::parse( "resv_550e8400-e29b-41d4-a716-446655440000" );
    assert!( matches!( result, Err( IdError::InvalidPrefix { .. } ) ) );
  }

  #[ test ]
  fn parse_rejects_missing_uuid()
  {
    let result = DraftId::parse( "draft_" );
    assert!( matches!( result, Err( IdError::MissingUuid ) ) );
  }

  #[ test ]
  fn parse_rejects_malformed_uuid()
  {
    let result = DraftId::parse( "draft_not-a-uuid" );
    assert!( matches!( result, Err( IdError::InvalidUuid( .. ) ) ) );
  }

  #[ test ]
  fn parse_rejects_empty()
  {
    assert!( matches!( DraftId::parse( "" ), Err( IdError::EmptyId ) ) );
  }

  #[ test ]
  fn serializes_as_plain_string()
  {
    let id = SecretId::generate();
    let json = serde_json::to_string( &id ).unwrap();
    assert_eq!( json, format!( "\"{}\"", id.as_str() ) );
  }

  #[ test ]
  fn test_fixture_is_deterministic()
  {
    let a = UserId::test_fixture( 7 );
    let b = UserId::test_fixture( 7 );
    assert_eq!( a, b );
  }
}
