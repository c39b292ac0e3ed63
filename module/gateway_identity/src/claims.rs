//! The JWT claim shape issued by the upstream identity provider.

use serde::{ Deserialize, Serialize };

/// Claims carried by an access token minted by the identity provider.
///
/// `groups` is the raw, unflattened group list; [`crate::resolver::IdentityResolver`]
/// turns it into the [`gateway_types::Principal`]'s `projects` and `roles`.
#[ derive( Debug, Clone, Serialize, Deserialize ) ]
pub struct IdentityClaims
{
  /// Stable subject identifier, expected in `user_<uuid>` form.
  pub sub: String,
  /// Verified email address.
  pub email: String,
  /// Group identifiers the identity provider attests the subject belongs to.
  #[ serde( default ) ]
  pub groups: Vec< String >,
  /// Issued-at, Unix seconds.
  pub iat: i64,
  /// Expiration, Unix seconds.
  pub exp: i64,
}
