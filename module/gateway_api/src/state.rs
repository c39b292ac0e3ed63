//! Shared application state: the one composition root every handler reads from.

use gateway_identity::IdentityResolver;
use gateway_lock::{ InMemoryDraftStore, LockManager };
use gateway_pipeline::GovernancePipeline;
use gateway_reliability::ModelBackend;
use gateway_vault::crypto::CryptoService;
use gateway_vault::store::SecretStore;
use std::sync::Arc;

/// Everything a handler needs, built once at startup and cloned per request.
///
/// Cloning is cheap: every field is an `Arc` or a cheaply-cloneable handle.
/// `Clone` is implemented by hand rather than derived, since every field is
/// `Arc`-wrapped and cloneable regardless of whether `S` or `B` themselves are.
pub struct ApiState< S: SecretStore, B: ModelBackend >
{
  /// Verifies bearer credentials and resolves the calling [`gateway_types::Principal`].
  pub identity: Arc< IdentityResolver >,
  /// The end-to-end chat governance chain.
  pub pipeline: Arc< GovernancePipeline< S, B > >,
  /// Workbench draft locking and review-state transitions.
  pub locks: Arc< LockManager< InMemoryDraftStore > >,
  /// Encrypts secrets submitted via `/vault/secrets` before they reach the store.
  pub crypto: Arc< CryptoService >,
  /// Backing store for encrypted provider credentials.
  pub secret_store: Arc< S >,
}

impl< S: SecretStore, B: ModelBackend > Clone for ApiState< S, B >
{
  fn clone( &self ) -> Self
  {
    Self
    {
      identity: self.identity.clone(),
      pipeline: self.pipeline.clone(),
      locks: self.locks.clone(),
      crypto: self.crypto.clone(),
      secret_store: self.secret_store.clone(),
    }
  }
}
