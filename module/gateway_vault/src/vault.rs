//! The vault reader: resolves `(project, service)` to decrypted secret material.

use crate::crypto::{ CryptoService, EncryptedSecret };
use crate::error::VaultError;
use crate::store::SecretStore;
use gateway_types::ids::ProjectId;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Decrypted secret bytes, scoped to the handler frame that fetched them.
///
/// Deliberately does not implement [`Clone`] or [`Copy`]: the contract
/// requires that material never be copied into a longer-lived container.
/// The wrapped buffer zeroizes itself on drop, so every exit path from the
/// handler — return, `?`, or panic-unwind — releases it.
pub struct SecretMaterial( Zeroizing< String > );

impl SecretMaterial
{
  /// Borrow the decrypted value for the duration of this call.
  #[must_use]
  pub fn expose( &self ) -> &str
  {
    &self.0
  }
}

impl core::fmt::Debug for SecretMaterial
{
  fn fmt( &self, f: &mut core::fmt::Formatter< '_ > ) -> core::fmt::Result
  {
    f.debug_tuple( "SecretMaterial" ).field( &"<redacted>" ).finish()
  }
}

/// Resolves `(project_id, service_name)` pairs to decrypted provider secrets.
///
/// Holds the process-wide master key for the life of the process; every
/// lookup decrypts fresh from the store rather than caching plaintext.
#[ derive( Debug ) ]
pub struct VaultReader< S: SecretStore >
{
  crypto: CryptoService,
  store: Arc< S >,
}

impl< S: SecretStore > VaultReader< S >
{
  /// Build a reader over `store`, decrypting with `crypto`.
  #[must_use]
  pub fn new( crypto: CryptoService, store: Arc< S > ) -> Self
  {
    Self { crypto, store }
  }

  /// Resolve `(project_id, service_name)` to its decrypted secret.
  ///
  /// # Errors
  ///
  /// Returns [`VaultError::NotFound`] if no row exists, or
  /// [`VaultError::SecretCorrupted`] if a row exists but fails to
  /// authenticate (wrong master key, tampered ciphertext, or a malformed
  /// base64 encoding).
  pub fn lookup( &self, project_id: &ProjectId, service_name: &str ) -> Result< SecretMaterial, VaultError >
  {
    let row = self.store.fetch( project_id, service_name ).ok_or( VaultError::NotFound )?;

    let encrypted = EncryptedSecret::from_base64( &row.ciphertext_b64, &row.nonce_b64 )
    .map_err( | e | VaultError::SecretCorrupted( e.to_string() ) )?;

    let plaintext = self.crypto.decrypt( &encrypted ).map_err( | e | VaultError::SecretCorrupted( e.to_string() ) )?;

    Ok( SecretMaterial( plaintext ) )
  }
}

#[ cfg( test ) ]
mod tests
{
  use super::*;
  use crate::store::{ InMemorySecretStore, StoredSecret };

  fn test_key() -> [ u8; crate::crypto::KEY_SIZE ]
  {
    [ 0x11u8; crate::crypto::KEY_SIZE ]
  }

  #[ test ]
  fn lookup_decrypts_stored_secret()
  {
    let crypto = CryptoService::new( &test_key() ).unwrap();
    let store = Arc::new( InMemorySecretStore::new() );
    let project = ProjectId::generate();

    let encrypted = crypto.encrypt( "sk-live-provider-key" ).unwrap();
    store.put( &project, "openai", StoredSecret::from_encrypted( &encrypted, 1 ) );

    let reader = VaultReader::new( crypto, store );
    let material = reader.lookup( &project, "openai" ).unwrap();
    assert_eq!( material.expose(), "sk-live-provider-key" );
  }

  #[ test ]
  fn lookup_missing_row_is_not_found()
  {
    let crypto = CryptoService::new( &test_key() ).unwrap();
    let store = Arc::new( InMemorySecretStore::new() );
    let reader = VaultReader::new( crypto, store );

    let err = reader.lookup( &ProjectId::generate(), "openai" ).unwrap_err();
    assert_eq!( err, VaultError::NotFound );
  }

  #[ test ]
  fn lookup_with_wrong_key_is_secret_corrupted()
  {
    let store = Arc::new( InMemorySecretStore::new() );
    let project = ProjectId::generate();

    let writer_key = CryptoService::new( &test_key() ).unwrap();
    let encrypted = writer_key.encrypt( "sk-live-provider-key" ).unwrap();
    store.put( &project, "openai", StoredSecret::from_encrypted( &encrypted, 1 ) );

    let reader_key = CryptoService::new( &[ 0x22u8; crate::crypto::KEY_SIZE ] ).unwrap();
    let reader = VaultReader::new( reader_key, store );

    let err = reader.lookup( &project, "openai" ).unwrap_err();
    assert!( matches!( err, VaultError::SecretCorrupted( .. ) ) );
  }
}
