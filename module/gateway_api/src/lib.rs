//! HTTP surface for the governance gateway: authentication, the chat
//! completions door onto [`gateway_pipeline`], workbench draft review, and
//! provider credential storage.

#![cfg_attr(not(feature = "enabled"), allow(unused))]

#[ cfg( feature = "enabled" ) ]
mod error;
#[ cfg( feature = "enabled" ) ]
mod extractor;
#[ cfg( feature = "enabled" ) ]
pub mod router;
#[ cfg( feature = "enabled" ) ]
pub mod routes;
#[ cfg( feature = "enabled" ) ]
mod state;

#[ cfg( feature = "enabled" ) ]
pub use error::{ ApiError, ErrorEnvelope };
#[ cfg( feature = "enabled" ) ]
pub use extractor::AuthenticatedPrincipal;
#[ cfg( feature = "enabled" ) ]
pub use state::ApiState;
