//! The grant returned by a successful lock acquisition.

use gateway_types::ids::UserId;

/// Whether a draft acquisition yielded write access or a read-only peek.
#[ derive( Debug, Clone, Copy, PartialEq, Eq ) ]
pub enum LockMode
{
  /// The caller now holds the lock and may update the draft.
  Edit,
  /// A manager viewing a draft locked by someone else; no mutation allowed.
  SafeView,
}

/// Result of a successful [`crate::manager::LockManager::acquire`] call.
#[ derive( Debug, Clone ) ]
pub struct LockGrant
{
  /// Edit or safe-view.
  pub mode: LockMode,
  /// The principal currently holding the edit lock, if this is a safe-view grant.
  pub holder: Option< UserId >,
}
