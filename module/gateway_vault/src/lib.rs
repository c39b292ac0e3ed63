//! Vault reader: resolves `(project, service)` pairs to decrypted secret material.
//!
//! Secrets are encrypted at rest with AES-256-GCM under a process-wide master
//! key loaded once at startup ([`crypto::CryptoService::from_env`]). A lookup
//! decrypts fresh from the store every time; nothing plaintext is ever cached,
//! logged, or persisted.
//!
//! ## Known pitfall: master key loss
//!
//! Losing the master key makes every stored secret permanently
//! undecryptable — there is no recovery path. Back it up outside the process.
//!
//! ## Known pitfall: secret redaction in logs
//!
//! [`vault::SecretMaterial`] redacts itself in `Debug` and zeroizes on drop,
//! but that only protects the value *inside* this crate. Callers must never
//! format [`vault::SecretMaterial::expose`]'s output into a log line or
//! telemetry payload.

#![cfg_attr(not(feature = "enabled"), allow(unused))]

#[ cfg( feature = "enabled" ) ]
pub mod crypto;
#[ cfg( feature = "enabled" ) ]
pub mod error;
#[ cfg( feature = "enabled" ) ]
pub mod store;
#[ cfg( feature = "enabled" ) ]
pub mod vault;

#[ cfg( feature = "enabled" ) ]
pub use error::VaultError;
#[ cfg( feature = "enabled" ) ]
pub use store::{ InMemorySecretStore, SecretStore, StoredSecret };
#[ cfg( feature = "enabled" ) ]
pub use vault::{ SecretMaterial, VaultReader };
