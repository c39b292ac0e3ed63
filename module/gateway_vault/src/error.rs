//! Error types for the vault reader.

/// Failures [`crate::VaultReader::lookup`] can report.
#[ derive( Debug, Clone, PartialEq, Eq, thiserror::Error ) ]
pub enum VaultError
{
  /// No secret is stored for this `(project_id, service_name)` pair.
  #[ error( "no secret stored for project/service" ) ]
  NotFound,

  /// A row exists but failed to decrypt: wrong master key or a tampered/corrupt row.
  #[ error( "secret row failed authentication: {0}" ) ]
  SecretCorrupted( String ),
}
