//! Encrypted-row storage backend for the vault.
//!
//! The store only ever holds ciphertext; [`CryptoService`](crate::crypto::CryptoService)
//! lives above it and never touches a store implementation directly.

use crate::crypto::EncryptedSecret;
use dashmap::DashMap;
use gateway_types::ids::ProjectId;

/// One encrypted secret row as persisted, keyed by `(project_id, service_name)`.
#[ derive( Debug, Clone ) ]
pub struct StoredSecret
{
  /// Base64 ciphertext, as produced by [`EncryptedSecret::ciphertext_base64`].
  pub ciphertext_b64: String,
  /// Base64 nonce, as produced by [`EncryptedSecret::nonce_base64`].
  pub nonce_b64: String,
  /// Identifier of the master key version this row was encrypted under.
  pub key_version: u32,
}

impl StoredSecret
{
  /// Build a row from an already-encrypted secret.
  #[must_use]
  pub fn from_encrypted( encrypted: &EncryptedSecret, key_version: u32 ) -> Self
  {
    Self
    {
      ciphertext_b64: encrypted.ciphertext_base64(),
      nonce_b64: encrypted.nonce_base64(),
      key_version,
    }
  }
}

/// Storage backend for encrypted secret rows.
///
/// Implementations must never decrypt or inspect plaintext; that is the
/// vault reader's job once a row has been fetched.
pub trait SecretStore: Send + Sync
{
  /// Fetch the encrypted row for `(project_id, service_name)`, if one exists.
  fn fetch( &self, project_id: &ProjectId, service_name: &str ) -> Option< StoredSecret >;

  /// Insert or replace the encrypted row for `(project_id, service_name)`.
  fn put( &self, project_id: &ProjectId, service_name: &str, secret: StoredSecret );
}

/// In-memory [`SecretStore`], suitable for the gateway's own process-local
/// cache of provider credentials. Holds ciphertext only.
#[ derive( Debug, Default ) ]
pub struct InMemorySecretStore
{
  rows: DashMap< ( ProjectId, String ), StoredSecret >,
}

impl InMemorySecretStore
{
  /// Build an empty store.
  #[must_use]
  pub fn new() -> Self
  {
    Self::default()
  }
}

impl SecretStore for InMemorySecretStore
{
  fn fetch( &self, project_id: &ProjectId, service_name: &str ) -> Option< StoredSecret >
  {
    self.rows.get( &( project_id.clone(), service_name.to_string() ) ).map( | r | r.clone() )
  }

  fn put( &self, project_id: &ProjectId, service_name: &str, secret: StoredSecret )
  {
    self.rows.insert( ( project_id.clone(), service_name.to_string() ), secret );
  }
}
