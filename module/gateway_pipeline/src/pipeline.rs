//! The governance pipeline: the single place a chat request's authorization,
//! spend, secrecy, inference, redaction, and audit trail are wired together.

use crate::error::{ from_inference, from_ledger, from_vault };
use chrono::Utc;
use gateway_ledger::{ pricing, BudgetLedger };
use gateway_redaction::{ scrub, Detector };
use gateway_reliability::{ provider_for_model, InferenceProxy, ModelBackend };
use gateway_telemetry::{ TelemetryQueue, TelemetryRecord };
use gateway_types::ids::ProjectId;
use gateway_types::{ GatewayError, Principal };
use gateway_vault::{ SecretStore, VaultReader };
use serde_json::{ json, Value };
use std::sync::Arc;

/// A conservative upper bound on completion length used only to size the
/// up-front reservation; the true cost is always re-priced from the
/// provider's reported usage at commit time.
const ESTIMATED_COMPLETION_TOKENS: u64 = 1024;

/// Composition root for one governed chat request.
///
/// Built once at startup and shared across all in-flight requests; every
/// field is an `Arc`'d collaborator so cloning the pipeline is cheap and
/// every request sees the same ledger, vault, and breaker state.
///
/// `Clone` is implemented by hand rather than derived: every field is
/// `Arc`-wrapped and cloneable regardless of whether `S` or `B` themselves are.
#[ derive( Debug ) ]
pub struct GovernancePipeline< S: SecretStore, B: ModelBackend >
{
  ledger: Arc< BudgetLedger >,
  vault: Arc< VaultReader< S > >,
  proxy: Arc< InferenceProxy< B > >,
  detector: Arc< Detector >,
  telemetry: TelemetryQueue,
}

impl< S: SecretStore, B: ModelBackend > Clone for GovernancePipeline< S, B >
{
  fn clone( &self ) -> Self
  {
    Self
    {
      ledger: self.ledger.clone(),
      vault: self.vault.clone(),
      proxy: self.proxy.clone(),
      detector: self.detector.clone(),
      telemetry: self.telemetry.clone(),
    }
  }
}

impl< S: SecretStore, B: ModelBackend > GovernancePipeline< S, B >
{
  /// Build a pipeline over the given collaborators.
  #[must_use]
  pub fn new( ledger: Arc< BudgetLedger >, vault: Arc< VaultReader< S > >, proxy: Arc< InferenceProxy< B > >, detector: Arc< Detector >, telemetry: TelemetryQueue ) -> Self
  {
    Self { ledger, vault, proxy, detector, telemetry }
  }

  /// Run one chat request through the full 8-step chain.
  ///
  /// `estimated_cost_hint`, if given, may only *increase* the server-computed
  /// reservation, never decrease it — a client cannot under-reserve its own spend.
  ///
  /// # Errors
  ///
  /// Returns a categorized [`GatewayError`]; see the module's step-by-step
  /// mapping for which category each failure surfaces as.
  pub async fn chat( &self, principal: &Principal, project_id: &ProjectId, model: &str, messages: Vec< Value >, estimated_cost_hint: Option< u64 > ) -> Result< Value, GatewayError >
  {
    let now = Utc::now();

    // 1. Authorization
    if !principal.can_access_project( project_id )
    {
      return Err( GatewayError::Forbidden( format!( "principal is not authorized for project {project_id}" ) ) );
    }

    // 2. Reservation
    let server_estimate = estimate_reservation( model, &messages );
    let reservation_amount = server_estimate.max( estimated_cost_hint.unwrap_or( 0 ) );
    let reservation = self.ledger.reserve( &principal.user_id, reservation_amount, now ).map_err( from_ledger )?;

    // 3. Secret acquisition
    let provider = provider_for_model( model );
    let secret = match self.vault.lookup( project_id, provider )
    {
      Ok( secret ) => secret,
      Err( error ) =>
      {
        let _ = self.ledger.refund( &reservation.id );
        return Err( from_vault( error ) );
      }
    };

    // 4. Inference
    let outcome = match self.proxy.invoke( model, &messages, None, &secret ).await
    {
      Ok( outcome ) => outcome,
      Err( error ) =>
      {
        let _ = self.ledger.refund( &reservation.id );
        return Err( from_inference( error ) );
      }
    };

    // 5. Redaction — clear-text request/response are discarded after this step.
    let scrubbed_request = scrub( &Value::Array( messages ), &self.detector );
    let scrubbed_response = scrub( &outcome.response, &self.detector );

    // 6. Reconciliation
    match self.ledger.commit( &reservation.id, outcome.cost_micros )
    {
      Ok( commit ) =>
      {
        if commit.overrun
        {
          tracing::warn!( reservation_id = %reservation.id, applied_micros = commit.applied_micros, "budget reservation overran its slack allowance" );
        }
      }
      Err( error ) => tracing::error!( reservation_id = %reservation.id, error = %error, "reconciliation of a settled reservation failed" ),
    }

    // 7. Telemetry — built from scrubbed values only (Invariant A).
    let record = TelemetryRecord::new(
      now,
      json!(
      {
        "user_id": principal.user_id,
        "project_id": project_id,
        "model": model,
        "request": scrubbed_request,
        "response": scrubbed_response,
        "cost_micros": outcome.cost_micros,
        "latency_ms": outcome.latency_ms,
      } ),
    );
    self.telemetry.enqueue( record );

    // 8. Respond — the unscrubbed response, to the originating caller only.
    Ok( outcome.response )
  }
}

/// Compute a conservative server-side cost estimate from message content
/// length, used only to size the reservation before the provider's real
/// token usage is known.
fn estimate_reservation( model: &str, messages: &[ Value ] ) -> u64
{
  let prompt_tokens = messages.iter()
  .filter_map( | message | message.get( "content" ).and_then( Value::as_str ) )
  .map( | content | u64::try_from( content.split_whitespace().count() ).unwrap_or( u64::MAX ) )
  .sum();

  pricing::estimate_cost_micros( model, prompt_tokens, ESTIMATED_COMPLETION_TOKENS )
}

#[ cfg( test ) ]
mod tests
{
  use super::*;
  use async_trait::async_trait;
  use gateway_reliability::{ BackendResponse, InferenceError };
  use gateway_telemetry::sink::{ InMemoryAuditSink, InMemoryDeadLetterSink };
  use gateway_telemetry::WorkerConfig;
  use gateway_vault::crypto::CryptoService;
  use gateway_vault::store::{ InMemorySecretStore, StoredSecret };
  use gateway_vault::SecretMaterial;

  struct EchoBackend;

  #[ async_trait ]
  impl ModelBackend for EchoBackend
  {
    async fn call( &self, _model: &str, _messages: &[ Value ], seed: u64, _secret: &SecretMaterial ) -> Result< BackendResponse, InferenceError >
    {
      Ok( BackendResponse { body: json!( { "seed_used": seed, "text": "contact john.doe@example.com" } ), prompt_tokens: 10, completion_tokens: 10 } )
    }
  }

  struct AlwaysFailsBackend;

  #[ async_trait ]
  impl ModelBackend for AlwaysFailsBackend
  {
    async fn call( &self, _model: &str, _messages: &[ Value ], _seed: u64, _secret: &SecretMaterial ) -> Result< BackendResponse, InferenceError >
    {
      Err( InferenceError::ServerError( 500 ) )
    }
  }

  fn seeded_vault( project_id: &ProjectId ) -> VaultReader< InMemorySecretStore >
  {
    let crypto = CryptoService::new( &[ 0x11u8; 32 ] ).unwrap();
    let store = Arc::new( InMemorySecretStore::new() );
    let encrypted = crypto.encrypt( "sk-test" ).unwrap();
    store.put( project_id, "openai", StoredSecret::from_encrypted( &encrypted, 1 ) );
    VaultReader::new( crypto, store )
  }

  fn dev_principal( project_id: ProjectId ) -> Principal
  {
    Principal
    {
      user_id: gateway_types::ids::UserId::generate(),
      email: "dev@example.com".into(),
      groups: Default::default(),
      projects: [ project_id ].into_iter().collect(),
      roles: [ gateway_types::Role::Developer ].into_iter().collect(),
    }
  }

  fn telemetry_handle() -> TelemetryQueue
  {
    let audit = Arc::new( InMemoryAuditSink::new() );
    let dead_letter = Arc::new( InMemoryDeadLetterSink::new() );
    let ( queue, _handles ) = gateway_telemetry::queue::spawn( WorkerConfig::default(), audit, dead_letter );
    queue
  }

  #[ tokio::test ]
  async fn full_chain_commits_and_returns_unscrubbed_response()
  {
    let project_id = ProjectId::generate();
    let principal = dev_principal( project_id.clone() );
    let ledger = Arc::new( BudgetLedger::new( 10_000_000, 300, 0 ) );
    let vault = Arc::new( seeded_vault( &project_id ) );
    let proxy = Arc::new( InferenceProxy::new( EchoBackend ) );
    let detector = Arc::new( Detector::new() );
    let pipeline = GovernancePipeline::new( ledger.clone(), vault, proxy, detector, telemetry_handle() );

    let messages = vec![ json!( { "role": "user", "content": "hello" } ) ];
    let response = pipeline.chat( &principal, &project_id, "gpt-4o-mini", messages, None ).await.unwrap();

    assert_eq!( response[ "text" ], json!( "contact john.doe@example.com" ) );
    assert!( ledger.committed_micros( &principal.user_id, Utc::now() ) > 0 );
  }

  #[ tokio::test ]
  async fn unauthorized_project_is_forbidden_before_any_reservation()
  {
    let project_id = ProjectId::generate();
    let other_project = ProjectId::generate();
    let principal = dev_principal( project_id );
    let ledger = Arc::new( BudgetLedger::new( 10_000_000, 300, 0 ) );
    let vault = Arc::new( seeded_vault( &other_project ) );
    let proxy = Arc::new( InferenceProxy::new( EchoBackend ) );
    let detector = Arc::new( Detector::new() );
    let pipeline = GovernancePipeline::new( ledger.clone(), vault, proxy, detector, telemetry_handle() );

    let err = pipeline.chat( &principal, &other_project, "gpt-4o-mini", vec![], None ).await.unwrap_err();
    assert!( matches!( err, GatewayError::Forbidden( .. ) ) );
    assert_eq!( ledger.committed_micros( &principal.user_id, Utc::now() ), 0 );
  }

  #[ tokio::test ]
  async fn budget_exceeded_blocks_before_any_secret_lookup()
  {
    let project_id = ProjectId::generate();
    let principal = dev_principal( project_id.clone() );
    let ledger = Arc::new( BudgetLedger::new( 1, 300, 0 ) );
    let vault = Arc::new( seeded_vault( &project_id ) );
    let proxy = Arc::new( InferenceProxy::new( EchoBackend ) );
    let detector = Arc::new( Detector::new() );
    let pipeline = GovernancePipeline::new( ledger, vault, proxy, detector, telemetry_handle() );

    let messages = vec![ json!( { "role": "user", "content": "hello" } ) ];
    let err = pipeline.chat( &principal, &project_id, "gpt-4o", messages, None ).await.unwrap_err();
    assert!( matches!( err, GatewayError::BudgetExceeded( .. ) ) );
  }

  #[ tokio::test ]
  async fn inference_failure_refunds_the_reservation()
  {
    let project_id = ProjectId::generate();
    let principal = dev_principal( project_id.clone() );
    let ledger = Arc::new( BudgetLedger::new( 10_000_000, 300, 0 ) );
    let vault = Arc::new( seeded_vault( &project_id ) );
    let proxy = Arc::new( InferenceProxy::new( AlwaysFailsBackend ) );
    let detector = Arc::new( Detector::new() );
    let pipeline = GovernancePipeline::new( ledger.clone(), vault, proxy, detector, telemetry_handle() );

    let messages = vec![ json!( { "role": "user", "content": "hello" } ) ];
    let err = pipeline.chat( &principal, &project_id, "gpt-4o-mini", messages, None ).await.unwrap_err();
    assert!( matches!( err, GatewayError::Upstream( .. ) ) );
    assert_eq!( ledger.committed_micros( &principal.user_id, Utc::now() ), 0 );
  }

  #[ tokio::test ]
  async fn client_hint_can_only_raise_the_reservation()
  {
    let project_id = ProjectId::generate();
    let principal = dev_principal( project_id.clone() );
    let ledger = Arc::new( BudgetLedger::new( 1_000, 300, 0 ) );
    let vault = Arc::new( seeded_vault( &project_id ) );
    let proxy = Arc::new( InferenceProxy::new( EchoBackend ) );
    let detector = Arc::new( Detector::new() );
    let pipeline = GovernancePipeline::new( ledger, vault, proxy, detector, telemetry_handle() );

    // A hint below the server estimate must not shrink the reservation enough
    // to let a too-expensive request through.
    let messages = vec![ json!( { "role": "user", "content": "hello" } ) ];
    let err = pipeline.chat( &principal, &project_id, "gpt-4o", messages, Some( 1 ) ).await.unwrap_err();
    assert!( matches!( err, GatewayError::BudgetExceeded( .. ) ) );
  }
}
