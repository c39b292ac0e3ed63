//! Inference proxy: forwards chat requests to a model provider with
//! deterministic parameters and per-model circuit breaking.

use crate::breaker::CircuitBreaker;
use crate::error::InferenceError;
use async_trait::async_trait;
use gateway_vault::SecretMaterial;
use serde_json::{ json, Value };
use std::collections::HashMap;
use std::time::Instant;

/// One upstream call's result before cost is attached.
#[ derive( Debug, Clone ) ]
pub struct BackendResponse
{
  /// Raw response body, returned to the caller verbatim.
  pub body: Value,
  /// Prompt tokens reported by the provider's usage block, if present.
  pub prompt_tokens: u64,
  /// Completion tokens reported by the provider's usage block, if present.
  pub completion_tokens: u64,
}

/// Abstraction over "make one call to a model provider", so the breaker and
/// determinism logic can be tested without a network.
#[ async_trait ]
pub trait ModelBackend: Send + Sync
{
  /// Perform one call to `model` with deterministic `seed`, authenticated by `secret`.
  async fn call( &self, model: &str, messages: &[ Value ], seed: u64, secret: &SecretMaterial ) -> Result< BackendResponse, InferenceError >;
}

/// [`ModelBackend`] that forwards to a real provider over HTTPS.
#[ derive( Debug ) ]
pub struct HttpModelBackend
{
  client: reqwest::Client,
  endpoints: HashMap< String, String >,
}

impl HttpModelBackend
{
  /// Build a backend that forwards to `endpoints`, a provider name (`"openai"`,
  /// `"anthropic"`, ...) mapped to its base URL.
  ///
  /// # Errors
  ///
  /// Returns [`InferenceError::ConnectionError`] if the HTTP client cannot be built.
  pub fn new( endpoints: HashMap< String, String > ) -> Result< Self, InferenceError >
  {
    let client = reqwest::Client::builder()
    .timeout( std::time::Duration::from_secs( 60 ) )
    .build()
    .map_err( | e | InferenceError::ConnectionError( e.to_string() ) )?;

    Ok( Self { client, endpoints } )
  }

}

/// Maps a model name to the provider that serves it (`"openai"`, `"anthropic"`, ...).
///
/// Used both to pick the HTTP endpoint and, by the governance pipeline, as
/// the vault's `service_name` when acquiring a provider credential.
#[must_use]
pub fn provider_for_model( model: &str ) -> &'static str
{
  if model.starts_with( "claude" )
  {
    "anthropic"
  }
  else
  {
    "openai"
  }
}

#[ async_trait ]
impl ModelBackend for HttpModelBackend
{
  async fn call( &self, model: &str, messages: &[ Value ], seed: u64, secret: &SecretMaterial ) -> Result< BackendResponse, InferenceError >
  {
    let provider = provider_for_model( model );
    let base_url = self.endpoints.get( provider )
    .ok_or_else( || InferenceError::ConnectionError( format!( "no endpoint configured for provider '{provider}'" ) ) )?;

    let body = json!(
    {
      "model": model,
      "messages": messages,
      "temperature": 0.0,
      "seed": seed,
    } );

    let response = self.client
    .post( format!( "{base_url}/v1/chat/completions" ) )
    .bearer_auth( secret.expose() )
    .json( &body )
    .send()
    .await
    .map_err( | e | if e.is_timeout() { InferenceError::Timeout } else { InferenceError::ConnectionError( e.to_string() ) } )?;

    let status = response.status();

    if status.is_server_error()
    {
      return Err( InferenceError::ServerError( status.as_u16() ) );
    }

    if status.is_client_error()
    {
      let body_text = response.text().await.unwrap_or_default();
      return Err( InferenceError::ClientError { status: status.as_u16(), body: body_text.chars().take( 200 ).collect() } );
    }

    let body: Value = response.json().await.map_err( | e | InferenceError::ConnectionError( e.to_string() ) )?;

    let usage = body.get( "usage" );
    let prompt_tokens = usage.and_then( | u | u.get( "prompt_tokens" ) ).and_then( Value::as_u64 ).unwrap_or( 0 );
    let completion_tokens = usage.and_then( | u | u.get( "completion_tokens" ) ).and_then( Value::as_u64 ).unwrap_or( 0 );

    Ok( BackendResponse { body, prompt_tokens, completion_tokens } )
  }
}

/// Result of a successful [`InferenceProxy::invoke`].
#[ derive( Debug, Clone ) ]
pub struct InferenceOutcome
{
  /// Upstream response body, unscrubbed. Safe to return to the originating
  /// caller only; every other exit path must scrub it first.
  pub response: Value,
  /// Cost of this call, estimated from reported token usage, in microdollars.
  pub cost_micros: u64,
  /// Wall-clock latency of the upstream call.
  pub latency_ms: u64,
}

/// Orchestrates a deterministic, circuit-broken call to a model provider.
#[ derive( Debug ) ]
pub struct InferenceProxy< B: ModelBackend >
{
  backend: B,
  breaker: CircuitBreaker,
}

impl< B: ModelBackend > InferenceProxy< B >
{
  /// Fixed seed used when the caller does not supply one, keeping calls
  /// reproducible.
  pub const DEFAULT_SEED: u64 = 42;

  /// Build a proxy over `backend` with the spec's default breaker thresholds.
  #[must_use]
  pub fn new( backend: B ) -> Self
  {
    Self { backend, breaker: CircuitBreaker::with_defaults() }
  }

  /// Invoke `model` with `messages`, forcing temperature 0.0 and a
  /// deterministic seed (`seed`, or [`Self::DEFAULT_SEED`] if omitted).
  ///
  /// # Errors
  ///
  /// Returns [`InferenceError::CircuitOpen`] without attempting a call if the
  /// model's breaker is open. Otherwise propagates the backend's failure and
  /// records it against the breaker unless it was a non-tripping 4xx.
  pub async fn invoke( &self, model: &str, messages: &[ Value ], seed: Option< u64 >, secret: &SecretMaterial ) -> Result< InferenceOutcome, InferenceError >
  {
    if !self.breaker.allow( model )
    {
      return Err( InferenceError::CircuitOpen );
    }

    let seed = seed.unwrap_or( Self::DEFAULT_SEED );
    let started = Instant::now();

    match self.backend.call( model, messages, seed, secret ).await
    {
      Ok( backend_response ) =>
      {
        self.breaker.record_success( model );
        let cost_micros = gateway_ledger::pricing::estimate_cost_micros( model, backend_response.prompt_tokens, backend_response.completion_tokens );
        Ok( InferenceOutcome
        {
          response: backend_response.body,
          cost_micros,
          latency_ms: u64::try_from( started.elapsed().as_millis() ).unwrap_or( u64::MAX ),
        } )
      }
      Err( error ) =>
      {
        if error.counts_as_breaker_failure()
        {
          self.breaker.record_failure( model );
        }
        Err( error )
      }
    }
  }
}

#[ cfg( test ) ]
mod tests
{
  use super::*;
  use gateway_vault::crypto::CryptoService;
  use gateway_vault::store::{ InMemorySecretStore, StoredSecret };
  use gateway_vault::VaultReader;
  use std::sync::atomic::{ AtomicU32, Ordering };
  use std::sync::Arc;

  struct FlakyBackend
  {
    calls: AtomicU32,
    fail_first_n: u32,
  }

  #[ async_trait ]
  impl ModelBackend for FlakyBackend
  {
    async fn call( &self, _model: &str, _messages: &[ Value ], seed: u64, _secret: &SecretMaterial ) -> Result< BackendResponse, InferenceError >
    {
      let call_no = self.calls.fetch_add( 1, Ordering::SeqCst );
      if call_no < self.fail_first_n
      {
        return Err( InferenceError::ServerError( 500 ) );
      }
      Ok( BackendResponse { body: json!( { "seed_used": seed } ), prompt_tokens: 100, completion_tokens: 50 } )
    }
  }

  fn fake_secret() -> SecretMaterial
  {
    let crypto = CryptoService::new( &[ 0x55u8; 32 ] ).unwrap();
    let store = Arc::new( InMemorySecretStore::new() );
    let project = gateway_types::ids::ProjectId::generate();
    let encrypted = crypto.encrypt( "sk-test" ).unwrap();
    store.put( &project, "openai", StoredSecret::from_encrypted( &encrypted, 1 ) );
    let reader = VaultReader::new( crypto, store );
    reader.lookup( &project, "openai" ).unwrap()
  }

  #[ tokio::test ]
  async fn uses_default_seed_when_none_supplied()
  {
    let proxy = InferenceProxy::new( FlakyBackend { calls: AtomicU32::new( 0 ), fail_first_n: 0 } );
    let secret = fake_secret();
    let outcome = proxy.invoke( "gpt-4o-mini", &[], None, &secret ).await.unwrap();
    assert_eq!( outcome.response[ "seed_used" ], json!( InferenceProxy::< FlakyBackend >::DEFAULT_SEED ) );
    assert!( outcome.cost_micros > 0 );
  }

  #[ tokio::test ]
  async fn repeated_server_errors_open_the_circuit()
  {
    let proxy = InferenceProxy::new( FlakyBackend { calls: AtomicU32::new( 0 ), fail_first_n: 10 } );
    let secret = fake_secret();

    for _ in 0..5
    {
      let _ = proxy.invoke( "gpt-4o-mini", &[], None, &secret ).await;
    }

    let err = proxy.invoke( "gpt-4o-mini", &[], None, &secret ).await.unwrap_err();
    assert!( matches!( err, InferenceError::CircuitOpen ) );
  }
}
