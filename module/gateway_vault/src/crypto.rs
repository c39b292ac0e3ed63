//! Authenticated encryption for secret material.
//!
//! Uses AES-256-GCM. The master key is loaded once at process startup and
//! held for the life of the process; it never touches the store.

use aes_gcm::
{
  aead::{ Aead, KeyInit, OsRng },
  Aes256Gcm,
  Nonce,
};
use rand::RngCore;
use zeroize::Zeroizing;

/// Nonce size for AES-256-GCM (96 bits = 12 bytes).
pub const NONCE_SIZE: usize = 12;

/// Key size for AES-256 (256 bits = 32 bytes).
pub const KEY_SIZE: usize = 32;

/// Environment variable carrying the base64-encoded 32-byte master key.
pub const MASTER_KEY_ENV_VAR: &str = "GATEWAY_VAULT_MASTER_KEY";

/// Ciphertext and nonce for one encrypted secret, as stored at rest.
#[ derive( Debug, Clone ) ]
pub struct EncryptedSecret
{
  /// Ciphertext plus GCM authentication tag.
  pub ciphertext: Vec< u8 >,
  /// 12-byte nonce used for this encryption.
  pub nonce: [ u8; NONCE_SIZE ],
}

impl EncryptedSecret
{
  /// Encode ciphertext as base64.
  #[must_use]
  pub fn ciphertext_base64( &self ) -> String
  {
    use base64::{ engine::general_purpose::STANDARD, Engine as _ };
    STANDARD.encode( &self.ciphertext )
  }

  /// Encode nonce as base64.
  #[must_use]
  pub fn nonce_base64( &self ) -> String
  {
    use base64::{ engine::general_purpose::STANDARD, Engine as _ };
    STANDARD.encode( self.nonce )
  }

  /// Decode ciphertext and nonce from their base64 forms, as read from the store.
  ///
  /// # Errors
  ///
  /// Returns [`CryptoError::InvalidBase64`] or [`CryptoError::InvalidNonceLength`]
  /// if either field is malformed. This is distinct from a failed decryption:
  /// a row that doesn't even parse is corrupt, not merely wrong-keyed.
  pub fn from_base64( ciphertext_b64: &str, nonce_b64: &str ) -> Result< Self, CryptoError >
  {
    use base64::{ engine::general_purpose::STANDARD, Engine as _ };

    let ciphertext = STANDARD.decode( ciphertext_b64 ).map_err( |_| CryptoError::InvalidBase64 )?;
    let nonce_vec = STANDARD.decode( nonce_b64 ).map_err( |_| CryptoError::InvalidBase64 )?;

    if nonce_vec.len() != NONCE_SIZE
    {
      return Err( CryptoError::InvalidNonceLength );
    }

    let mut nonce = [ 0u8; NONCE_SIZE ];
    nonce.copy_from_slice( &nonce_vec );

    Ok( Self { ciphertext, nonce } )
  }
}

/// Process-wide AES-256-GCM cipher, keyed by the master key.
pub struct CryptoService
{
  cipher: Aes256Gcm,
}

impl core::fmt::Debug for CryptoService
{
  fn fmt( &self, f: &mut core::fmt::Formatter< '_ > ) -> core::fmt::Result
  {
    f.debug_struct( "CryptoService" ).field( "cipher", &"<redacted>" ).finish()
  }
}

impl CryptoService
{
  /// Build a service from a raw 32-byte key.
  ///
  /// # Errors
  ///
  /// Returns [`CryptoError::InvalidKeyLength`] if `master_key` is not exactly
  /// [`KEY_SIZE`] bytes.
  pub fn new( master_key: &[ u8 ] ) -> Result< Self, CryptoError >
  {
    if master_key.len() != KEY_SIZE
    {
      return Err( CryptoError::InvalidKeyLength );
    }

    let cipher = Aes256Gcm::new_from_slice( master_key ).map_err( |_| CryptoError::InvalidKey )?;
    Ok( Self { cipher } )
  }

  /// Build a service from [`MASTER_KEY_ENV_VAR`], base64-decoded.
  ///
  /// # Errors
  ///
  /// Returns [`CryptoError::MasterKeyNotSet`] if the variable is absent, or
  /// the decode/length errors [`CryptoService::new`] can return.
  pub fn from_env() -> Result< Self, CryptoError >
  {
    use base64::{ engine::general_purpose::STANDARD, Engine as _ };

    let master_key_b64 = std::env::var( MASTER_KEY_ENV_VAR ).map_err( |_| CryptoError::MasterKeyNotSet )?;
    let master_key = STANDARD.decode( &master_key_b64 ).map_err( |_| CryptoError::InvalidBase64 )?;
    Self::new( &master_key )
  }

  /// Encrypt `plaintext` under a freshly generated nonce.
  ///
  /// # Errors
  ///
  /// Returns [`CryptoError::EncryptionFailed`] if the underlying AEAD operation fails.
  pub fn encrypt( &self, plaintext: &str ) -> Result< EncryptedSecret, CryptoError >
  {
    let mut nonce_bytes = [ 0u8; NONCE_SIZE ];
    OsRng.fill_bytes( &mut nonce_bytes );
    let nonce = Nonce::from_slice( &nonce_bytes );

    let ciphertext = self.cipher.encrypt( nonce, plaintext.as_bytes() ).map_err( |_| CryptoError::EncryptionFailed )?;

    Ok( EncryptedSecret { ciphertext, nonce: nonce_bytes } )
  }

  /// Decrypt `encrypted`, returning plaintext that zeroizes itself on drop.
  ///
  /// # Errors
  ///
  /// Returns [`CryptoError::DecryptionFailed`] on GCM tag mismatch (wrong key
  /// or tampered ciphertext), or [`CryptoError::InvalidUtf8`] if the decrypted
  /// bytes are not valid UTF-8.
  pub fn decrypt( &self, encrypted: &EncryptedSecret ) -> Result< Zeroizing< String >, CryptoError >
  {
    let nonce = Nonce::from_slice( &encrypted.nonce );

    let plaintext_bytes = self.cipher.decrypt( nonce, encrypted.ciphertext.as_ref() ).map_err( |_| CryptoError::DecryptionFailed )?;
    let plaintext = String::from_utf8( plaintext_bytes ).map_err( |_| CryptoError::InvalidUtf8 )?;

    Ok( Zeroizing::new( plaintext ) )
  }
}

/// Crypto operation errors.
#[ derive( Debug, Clone, PartialEq, Eq ) ]
pub enum CryptoError
{
  /// Master key environment variable not set.
  MasterKeyNotSet,
  /// Master key must be [`KEY_SIZE`] bytes.
  InvalidKeyLength,
  /// Failed to construct a cipher from the master key.
  InvalidKey,
  /// Invalid base64 encoding.
  InvalidBase64,
  /// Nonce must be [`NONCE_SIZE`] bytes.
  InvalidNonceLength,
  /// AES-GCM encryption failed.
  EncryptionFailed,
  /// AES-GCM decryption failed: wrong key or tampered ciphertext.
  DecryptionFailed,
  /// Decrypted bytes are not valid UTF-8.
  InvalidUtf8,
}

impl core::fmt::Display for CryptoError
{
  fn fmt( &self, f: &mut core::fmt::Formatter< '_ > ) -> core::fmt::Result
  {
    match self
    {
      Self::MasterKeyNotSet => write!( f, "master key not set: environment variable {MASTER_KEY_ENV_VAR} not found" ),
      Self::InvalidKeyLength => write!( f, "invalid key length: master key must be {KEY_SIZE} bytes" ),
      Self::InvalidKey => write!( f, "invalid master key" ),
      Self::InvalidBase64 => write!( f, "invalid base64 encoding" ),
      Self::InvalidNonceLength => write!( f, "invalid nonce length: must be {NONCE_SIZE} bytes" ),
      Self::EncryptionFailed => write!( f, "encryption failed" ),
      Self::DecryptionFailed => write!( f, "decryption failed: wrong key or tampered ciphertext" ),
      Self::InvalidUtf8 => write!( f, "decrypted data is not valid utf-8" ),
    }
  }
}

impl std::error::Error for CryptoError {}

/// Mask a secret value for display in logs or UI: never show the full value.
///
/// `len <= 8` masks fully to `"***"`; longer values show a 4-character prefix
/// and 3-character suffix.
#[must_use]
pub fn mask_secret( value: &str ) -> String
{
  let len = value.len();

  if len <= 8
  {
    return "***".to_string();
  }

  let prefix = &value[ ..4 ];
  let suffix = &value[ len - 3.. ];
  format!( "{prefix}...{suffix}" )
}
