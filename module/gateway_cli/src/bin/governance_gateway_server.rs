//! Process entrypoint: wires every collaborator and serves the gateway's HTTP surface.

use gateway_config::GatewaySettings;
use gateway_identity::IdentityResolver;
use gateway_ledger::BudgetLedger;
use gateway_lock::{ InMemoryDraftStore, LockManager };
use gateway_pipeline::GovernancePipeline;
use gateway_redaction::Detector;
use gateway_reliability::{ HttpModelBackend, InferenceProxy };
use gateway_telemetry::sink::{ InMemoryAuditSink, InMemoryDeadLetterSink };
use gateway_vault::crypto::CryptoService;
use gateway_vault::store::InMemorySecretStore;
use gateway_vault::VaultReader;
use jsonwebtoken::Algorithm;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Grace period to let telemetry workers drain on shutdown.
const TELEMETRY_SHUTDOWN_GRACE: Duration = Duration::from_secs( 5 );
/// Reservation grace period: how long an authorized-but-uncommitted spend holds its reservation.
const LEDGER_GRACE_SECONDS: i64 = 300;

#[ tokio::main ]
async fn main() -> Result< (), Box< dyn std::error::Error > >
{
  dotenvy::dotenv().ok();

  let settings = GatewaySettings::load()?;
  let log_level = if settings.debug { gateway_telemetry::LogLevel::Debug } else { gateway_telemetry::LogLevel::Info };
  gateway_telemetry::init_logging( log_level )?;

  tracing::info!( environment = ?settings.environment, port = settings.port, "starting governance gateway" );

  let identity = Arc::new( identity_resolver( &settings ).await? );
  let vault_key = vault_master_key( &settings )?;
  let crypto = Arc::new( CryptoService::new( &vault_key )? );
  let secret_store = Arc::new( InMemorySecretStore::new() );
  let vault = Arc::new( VaultReader::new( CryptoService::new( &vault_key )?, secret_store.clone() ) );

  let daily_cap_micros = settings.daily_cap_units.saturating_mul( 1_000_000 );
  let ledger = Arc::new( BudgetLedger::new( daily_cap_micros, LEDGER_GRACE_SECONDS, 0 ) );
  let detector = Arc::new( Detector::new() );

  let backend = HttpModelBackend::new( provider_endpoints() )?;
  let proxy = Arc::new( InferenceProxy::new( backend ) );

  let audit_sink = Arc::new( InMemoryAuditSink::new() );
  let dead_letter_sink = Arc::new( InMemoryDeadLetterSink::new() );
  let ( telemetry, telemetry_handles ) = gateway_telemetry::queue::spawn(
    gateway_telemetry::queue::WorkerConfig::default(),
    audit_sink,
    dead_letter_sink,
  );

  let pipeline = Arc::new( GovernancePipeline::new( ledger, vault, proxy, detector, telemetry.clone() ) );
  let locks = Arc::new( LockManager::new( Arc::new( InMemoryDraftStore::new() ) ) );

  let state = gateway_api::ApiState { identity, pipeline, locks, crypto, secret_store };
  let app = gateway_api::router::build( state );

  let listener = tokio::net::TcpListener::bind( ( settings.host.as_str(), settings.port ) ).await?;
  tracing::info!( addr = %listener.local_addr()?, "listening" );

  axum::serve( listener, app )
  .with_graceful_shutdown( shutdown_signal() )
  .await?;

  gateway_telemetry::queue::shutdown( telemetry, telemetry_handles, TELEMETRY_SHUTDOWN_GRACE ).await;

  Ok( () )
}

async fn shutdown_signal()
{
  let _ = tokio::signal::ctrl_c().await;
  tracing::info!( "shutdown signal received" );
}

/// Resolve the identity provider's signing key into an [`IdentityResolver`].
///
/// In development, a missing `identity.signing_key_url` falls back to an
/// insecure local HMAC key rather than failing startup, matching
/// [`gateway_config::GatewaySettings`]'s own development-mode leniency.
/// Production startup already refuses to boot without this URL set, via
/// `GatewaySettings::load`'s critical-secret validation.
async fn identity_resolver( settings: &GatewaySettings ) -> Result< IdentityResolver, Box< dyn std::error::Error > >
{
  let algorithm = parse_algorithm( &settings.identity_provider.algorithm );

  if settings.identity_provider.signing_key_url.is_empty()
  {
    tracing::warn!( "no identity provider signing key configured, using an insecure development default" );
    return Ok( IdentityResolver::from_pem( DEV_SIGNING_SECRET, Algorithm::HS256 ) );
  }

  let pem = reqwest::get( &settings.identity_provider.signing_key_url ).await?.bytes().await?;
  Ok( IdentityResolver::from_pem( &pem, algorithm ) )
}

const DEV_SIGNING_SECRET: &[ u8 ] = b"development-only-insecure-signing-secret";

fn parse_algorithm( name: &str ) -> Algorithm
{
  match name
  {
    "HS256" => Algorithm::HS256,
    "ES256" => Algorithm::ES256,
    _ => Algorithm::RS256,
  }
}

/// Resolve the vault's 32-byte master key from `GATEWAY_VAULT_MASTER_KEY`
/// (base64-encoded). In development, an absent key falls back to a freshly
/// generated one so the process can still start; every secret encrypted
/// under it becomes unreadable across a restart, which is acceptable for a
/// throwaway local key. Production startup already refuses to boot without
/// this variable set, via `GatewaySettings::load`'s critical-secret validation.
fn vault_master_key( settings: &GatewaySettings ) -> Result< Vec< u8 >, Box< dyn std::error::Error > >
{
  use base64::{ engine::general_purpose::STANDARD, Engine as _ };

  match std::env::var( gateway_vault::crypto::MASTER_KEY_ENV_VAR )
  {
    Ok( key_b64 ) => Ok( STANDARD.decode( &key_b64 )? ),
    Err( _ ) if !settings.environment.is_production() =>
    {
      tracing::warn!( "no vault master key configured, generating an ephemeral development key" );
      let mut key = vec![ 0u8; 32 ];
      rand::rngs::OsRng.fill_bytes( &mut key );
      Ok( key )
    }
    Err( error ) => Err( error.into() ),
  }
}

fn provider_endpoints() -> HashMap< String, String >
{
  let mut endpoints = HashMap::new();
  endpoints.insert(
    "openai".to_string(),
    std::env::var( "GATEWAY_OPENAI_ENDPOINT" ).unwrap_or_else( |_| "https://api.openai.com".to_string() ),
  );
  endpoints.insert(
    "anthropic".to_string(),
    std::env::var( "GATEWAY_ANTHROPIC_ENDPOINT" ).unwrap_or_else( |_| "https://api.anthropic.com".to_string() ),
  );
  endpoints
}
