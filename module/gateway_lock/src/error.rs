//! Failure modes for draft lock operations.

use gateway_types::ids::UserId;

/// Why a lock operation did not succeed.
#[ derive( Debug, Clone, PartialEq, Eq, thiserror::Error ) ]
pub enum LockError
{
  /// No draft with the given id exists.
  #[ error( "draft not found" ) ]
  NotFound,

  /// The draft is locked by someone else and the caller has no safe-view path.
  #[ error( "draft is locked by another principal" ) ]
  LockConflict
  {
    /// The principal currently holding the lock.
    holder: UserId,
  },

  /// The caller is not authorized for this operation (not the owner, or not a manager).
  #[ error( "forbidden" ) ]
  Forbidden,

  /// The requested state transition is not valid from the draft's current status.
  #[ error( "invalid transition from current draft status" ) ]
  Conflict,

  /// A lower-level storage failure.
  #[ error( "storage error: {0}" ) ]
  Storage( String ),
}
