//! Layered configuration for the governance gateway process.
//!
//! Five layers, highest priority first: environment variables, project
//! config (`config/gateway.{env}.toml`), user config
//! (`~/.config/governance_gateway/gateway.toml`), workspace defaults
//! (`config/gateway.default.toml`), and crate defaults. [`GatewaySettings::load`]
//! resolves all of them into one struct and refuses to start in production
//! if a critical secret is missing.

#![cfg_attr(not(feature = "enabled"), allow(unused))]

#[ cfg( feature = "enabled" ) ]
pub mod error;
#[ cfg( feature = "enabled" ) ]
pub mod layer;
#[ cfg( feature = "enabled" ) ]
pub mod settings;

#[ cfg( feature = "enabled" ) ]
pub use error::{ ConfigError, Result };
#[ cfg( feature = "enabled" ) ]
pub use layer::{ ConfigLayer, ConfigValue, EnvLayer, FileLayer, LayersBuilder };
#[ cfg( feature = "enabled" ) ]
pub use settings::{ Environment, GatewaySettings, IdentityProviderConfig };
