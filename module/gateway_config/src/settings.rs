//! Process-wide settings assembled from the layered configuration sources.

use crate::error::{ ConfigError, Result };
use crate::layer::{ ConfigLayer, LayersBuilder };

/// Deployment environment the process is running under.
#[ derive( Debug, Clone, Copy, PartialEq, Eq ) ]
pub enum Environment
{
  /// Local development; missing secrets fall back to insecure defaults.
  Development,
  /// Automated test runs.
  Test,
  /// Live traffic; missing critical secrets must fail startup.
  Production,
}

impl Environment
{
  fn parse( value: &str ) -> Self
  {
    match value.to_lowercase().as_str()
    {
      "production" | "prod" => Self::Production,
      "test" => Self::Test,
      _ => Self::Development,
    }
  }

  /// True when running in production.
  #[must_use]
  pub fn is_production( &self ) -> bool
  {
    matches!( self, Self::Production )
  }
}

/// Coordinates for verifying identity-provider-signed credentials.
#[ derive( Debug, Clone ) ]
pub struct IdentityProviderConfig
{
  /// URL the signing key (JWKS or equivalent) is fetched from.
  pub signing_key_url: String,
  /// Signature algorithm the identity provider uses (e.g. `RS256`).
  pub algorithm: String,
}

/// Fully resolved process configuration, assembled once at startup from the
/// layered sources in [`LayersBuilder`].
#[ derive( Debug, Clone ) ]
pub struct GatewaySettings
{
  /// The running environment.
  pub environment: Environment,
  /// Verbose diagnostics switch; never enabled in production by default.
  pub debug: bool,
  /// Bind host for the HTTP surface.
  pub host: String,
  /// Bind port for the HTTP surface.
  pub port: u16,
  /// Connection coordinates for the persistence store (drafts, audit, vault rows).
  pub persistence_url: String,
  /// Connection coordinates for the distributed budget counter store.
  pub counter_store_url: String,
  /// Identity provider signing-key coordinates.
  pub identity_provider: IdentityProviderConfig,
  /// Daily monetary cap, in whole currency units (converted to micros by the caller).
  pub daily_cap_units: u64,
  /// Whether enterprise-only features (e.g. manager safe-view) are licensed.
  pub enterprise_license: bool,
}

impl GatewaySettings
{
  /// Load settings through the 5-layer precedence chain for the `"gateway"` module.
  ///
  /// # Errors
  ///
  /// Returns an error if a required key is absent from every layer, or if a
  /// present value has the wrong type.
  pub fn load() -> Result< Self >
  {
    let layers = LayersBuilder::new( "gateway" ).build()?;
    Self::from_layers( &layers )
  }

  fn from_layers( layers: &[ Box< dyn ConfigLayer > ] ) -> Result< Self >
  {
    let environment = Environment::parse( &get_string( layers, "environment", "development" )? );
    let debug = get_bool( layers, "debug", false )?;
    let host = get_string( layers, "host", "0.0.0.0" )?;
    let port = get_int( layers, "port", 8080 )? as u16;
    let persistence_url = get_string( layers, "persistence.url", "" )?;
    let counter_store_url = get_string( layers, "counter.url", "" )?;
    let identity_provider = IdentityProviderConfig
    {
      signing_key_url: get_string( layers, "identity.signing_key_url", "" )?,
      algorithm: get_string( layers, "identity.algorithm", "RS256" )?,
    };
    let daily_cap_units = get_int( layers, "budget.daily_cap_units", 50 )? as u64;
    let enterprise_license = get_bool( layers, "license.enterprise", false )?;

    let settings = Self
    {
      environment,
      debug,
      host,
      port,
      persistence_url,
      counter_store_url,
      identity_provider,
      daily_cap_units,
      enterprise_license,
    };

    settings.validate_critical_secrets()?;
    Ok( settings )
  }

  /// Refuse to start in production with missing connection coordinates, an
  /// absent identity-provider signing key, or no vault master key.
  ///
  /// The master key itself is read directly from `GATEWAY_VAULT_MASTER_KEY`
  /// by the vault crate; this only confirms it is present and well-formed so
  /// a misconfigured production deployment fails at startup rather than on
  /// the first request that needs a secret.
  fn validate_critical_secrets( &self ) -> Result< () >
  {
    if !self.environment.is_production()
    {
      return Ok( () );
    }

    if self.persistence_url.is_empty()
    {
      return Err( ConfigError::CriticalSecretMissing( "persistence.url".into() ) );
    }
    if self.counter_store_url.is_empty()
    {
      return Err( ConfigError::CriticalSecretMissing( "counter.url".into() ) );
    }
    if self.identity_provider.signing_key_url.is_empty()
    {
      return Err( ConfigError::CriticalSecretMissing( "identity.signing_key_url".into() ) );
    }

    match std::env::var( "GATEWAY_VAULT_MASTER_KEY" )
    {
      Ok( key ) if key.len() == 64 && key.bytes().all( | b | b.is_ascii_hexdigit() ) => {}
      _ => return Err( ConfigError::CriticalSecretMissing( "GATEWAY_VAULT_MASTER_KEY".into() ) ),
    }

    Ok( () )
  }
}

fn get_string( layers: &[ Box< dyn ConfigLayer > ], key: &str, default: &str ) -> Result< String >
{
  for layer in layers
  {
    if let Some( value ) = layer.get( key )?
    {
      return value.value.as_str()
      .map( str::to_string )
      .ok_or_else( || ConfigError::InvalidType { key: key.into(), expected: "string".into(), actual: format!( "{:?}", value.value ) } );
    }
  }
  Ok( default.to_string() )
}

fn get_bool( layers: &[ Box< dyn ConfigLayer > ], key: &str, default: bool ) -> Result< bool >
{
  for layer in layers
  {
    if let Some( value ) = layer.get( key )?
    {
      return value.value.as_bool()
      .ok_or_else( || ConfigError::InvalidType { key: key.into(), expected: "bool".into(), actual: format!( "{:?}", value.value ) } );
    }
  }
  Ok( default )
}

fn get_int( layers: &[ Box< dyn ConfigLayer > ], key: &str, default: i64 ) -> Result< i64 >
{
  for layer in layers
  {
    if let Some( value ) = layer.get( key )?
    {
      return value.value.as_integer()
      .ok_or_else( || ConfigError::InvalidType { key: key.into(), expected: "integer".into(), actual: format!( "{:?}", value.value ) } );
    }
  }
  Ok( default )
}

#[ cfg( test ) ]
mod tests
{
  use super::*;
  use crate::layer::FileLayer;

  fn layers_with( toml: &str ) -> Vec< Box< dyn ConfigLayer > >
  {
    vec![ Box::new( FileLayer::from_str( "Test", 1, toml ).unwrap() ) ]
  }

  #[ test ]
  fn defaults_apply_development_when_unset()
  {
    let settings = GatewaySettings::from_layers( &layers_with( "" ) ).unwrap();
    assert_eq!( settings.environment, Environment::Development );
    assert!( !settings.debug );
    assert_eq!( settings.port, 8080 );
  }

  #[ test ]
  fn production_without_persistence_url_fails_startup()
  {
    let toml = r#"
environment = "production"
"#;
    let err = GatewaySettings::from_layers( &layers_with( toml ) ).unwrap_err();
    assert!( matches!( err, ConfigError::CriticalSecretMissing( key ) if key == "persistence.url" ) );
  }

  #[ test ]
  fn production_with_all_coordinates_but_no_master_key_fails()
  {
    let toml = r#"
environment = "production"

[persistence]
url = "postgres://db/gateway"

[counter]
url = "redis://counter"

[identity]
signing_key_url = "https://idp.example/jwks"
"#;
    std::env::remove_var( "GATEWAY_VAULT_MASTER_KEY" );
    let err = GatewaySettings::from_layers( &layers_with( toml ) ).unwrap_err();
    assert!( matches!( err, ConfigError::CriticalSecretMissing( key ) if key == "GATEWAY_VAULT_MASTER_KEY" ) );
  }

  #[ test ]
  fn development_allows_missing_secrets()
  {
    let settings = GatewaySettings::from_layers( &layers_with( "environment = \"development\"" ) ).unwrap();
    assert!( !settings.environment.is_production() );
  }
}
