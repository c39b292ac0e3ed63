//! Shared types for the governance gateway.
//!
//! This crate provides the foundational types used across all gateway
//! modules: entity identifiers ([`ids`]), the request [`Principal`], and the
//! categorized [`GatewayError`] that every component boundary converts into.
//! All types are feature-gated behind the `enabled` feature.

#![cfg_attr(not(feature = "enabled"), allow(unused))]

/// Validated, type-safe entity identifiers.
#[cfg(feature = "enabled")]
pub mod ids;

#[cfg(feature = "enabled")]
mod types
{
  use serde::{ Deserialize, Serialize };
  use std::collections::BTreeSet;
  use thiserror::Error;

  use crate::ids::{ ProjectId, UserId };

  /// A role a principal can hold. `Manager` is always derived from group
  /// membership upstream, never self-claimed by the caller.
  #[ derive( Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize ) ]
  #[ serde( rename_all = "UPPERCASE" ) ]
  pub enum Role
  {
    /// Ordinary engineer: may edit their own drafts and spend their own budget.
    Developer,
    /// Compliance/approval role: may safe-view locked drafts and approve/reject.
    Manager,
  }

  /// An authenticated caller, fully resolved for the duration of one request.
  ///
  /// Built fresh by the identity resolver on every request (see
  /// `gateway_identity`) and never cached, so that a revocation in the
  /// upstream identity provider takes effect within one request.
  #[ derive( Debug, Clone, Serialize, Deserialize ) ]
  pub struct Principal
  {
    /// Stable subject identifier from the identity provider.
    pub user_id: UserId,
    /// Verified email address.
    pub email: String,
    /// Group identifiers the subject belongs to, deduplicated.
    pub groups: BTreeSet< String >,
    /// Project identifiers the subject is authorized against.
    pub projects: BTreeSet< ProjectId >,
    /// Roles derived from group membership.
    pub roles: BTreeSet< Role >,
  }

  impl Principal
  {
    /// True if this principal is authorized against the given project.
    #[must_use]
    pub fn can_access_project( &self, project_id: &ProjectId ) -> bool
    {
      self.projects.contains( project_id )
    }

    /// True if this principal holds the `Manager` role.
    #[must_use]
    pub fn is_manager( &self ) -> bool
    {
      self.roles.contains( &Role::Manager )
    }
  }

  /// Categorized failure that crosses a component boundary.
  ///
  /// Every pipeline step converts collaborator-specific failures into one of
  /// these categories before continuing; only categorized errors are allowed
  /// to cross the HTTP boundary, and raw upstream messages never do.
  #[ derive( Debug, Error ) ]
  pub enum GatewayError
  {
    /// No bearer credential was presented.
    #[ error( "missing authentication credential" ) ]
    AuthMissing,

    /// The credential was malformed, unsigned, expired, or names an unknown subject.
    #[ error( "invalid authentication credential: {0}" ) ]
    AuthInvalid( String ),

    /// The caller is authenticated but not authorized for the requested resource.
    #[ error( "forbidden: {0}" ) ]
    Forbidden( String ),

    /// The requested resource does not exist.
    #[ error( "not found: {0}" ) ]
    NotFound( String ),

    /// The request failed input validation.
    #[ error( "validation failed: {0}" ) ]
    ValidationFailed( String ),

    /// The daily budget would be exceeded by this request.
    #[ error( "budget exceeded: {0}" ) ]
    BudgetExceeded( String ),

    /// A workbench lock is held by another principal.
    #[ error( "lock conflict: {0}" ) ]
    LockConflict( String ),

    /// The requested state transition is not valid from the resource's current state.
    #[ error( "conflict: {0}" ) ]
    Conflict( String ),

    /// The upstream collaborator is temporarily unavailable (circuit open or transient failure).
    #[ error( "unavailable: {0}" ) ]
    Unavailable( String ),

    /// The upstream collaborator returned a non-retryable failure.
    #[ error( "upstream error: {0}" ) ]
    Upstream( String ),

    /// A required piece of configuration or a secret could not be resolved.
    #[ error( "configuration error: {0}" ) ]
    ConfigurationError( String ),

    /// An unexpected internal failure. Never retried silently.
    #[ error( "internal error: {0}" ) ]
    Internal( String ),
  }

  impl GatewayError
  {
    /// Machine-readable category name, used for telemetry and logs.
    ///
    /// The category itself is never PII, so it is safe to record even on the
    /// failure path where no payload is available.
    #[must_use]
    pub fn category( &self ) -> &'static str
    {
      match self
      {
        Self::AuthMissing => "AuthMissing",
        Self::AuthInvalid( .. ) => "AuthInvalid",
        Self::Forbidden( .. ) => "Forbidden",
        Self::NotFound( .. ) => "NotFound",
        Self::ValidationFailed( .. ) => "ValidationFailed",
        Self::BudgetExceeded( .. ) => "BudgetExceeded",
        Self::LockConflict( .. ) => "LockConflict",
        Self::Conflict( .. ) => "Conflict",
        Self::Unavailable( .. ) => "Unavailable",
        Self::Upstream( .. ) => "Upstream",
        Self::ConfigurationError( .. ) => "ConfigurationError",
        Self::Internal( .. ) => "Internal",
      }
    }
  }

  /// Result type threaded through every gateway component.
  pub type Result< T > = std::result::Result< T, GatewayError >;
}

#[cfg(feature = "enabled")]
pub use types::*;

#[cfg(test)]
mod tests
{
  use super::*;

  #[test]
  fn manager_role_detected()
  {
    let principal = Principal
    {
      user_id: ids::UserId::generate(),
      email: "m@example.com".into(),
      groups: Default::default(),
      projects: Default::default(),
      roles: [ Role::Manager ].into_iter().collect(),
    };
    assert!( principal.is_manager() );
  }

  #[test]
  fn project_access_checked_by_set_membership()
  {
    let project = ids::ProjectId::generate();
    let principal = Principal
    {
      user_id: ids::UserId::generate(),
      email: "d@example.com".into(),
      groups: Default::default(),
      projects: [ project.clone() ].into_iter().collect(),
      roles: [ Role::Developer ].into_iter().collect(),
    };
    assert!( principal.can_access_project( &project ) );
    assert!( !principal.can_access_project( &ids::ProjectId::generate() ) );
  }

  #[test]
  fn error_category_is_stable()
  {
    assert_eq!( GatewayError::BudgetExceeded( "x".into() ).category(), "BudgetExceeded" );
    assert_eq!( GatewayError::LockConflict( "x".into() ).category(), "LockConflict" );
  }
}
