//! Resolves authentication credentials into a verified [`gateway_types::Principal`].
//!
//! Every call to [`resolver::IdentityResolver::resolve`] performs full
//! signature and expiry verification and rebuilds the principal from the
//! token's claims — no principal is ever cached across requests, so a
//! revocation made upstream is honored on the very next call.

#![cfg_attr(not(feature = "enabled"), allow(unused))]

#[ cfg( feature = "enabled" ) ]
pub mod claims;
#[ cfg( feature = "enabled" ) ]
pub mod error;
#[ cfg( feature = "enabled" ) ]
pub mod resolver;

#[ cfg( feature = "enabled" ) ]
pub use claims::IdentityClaims;
#[ cfg( feature = "enabled" ) ]
pub use error::AuthError;
#[ cfg( feature = "enabled" ) ]
pub use resolver::IdentityResolver;
