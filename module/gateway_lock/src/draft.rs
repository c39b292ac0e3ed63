//! The workbench draft entity the lock manager governs.

use chrono::{ DateTime, Utc };
use gateway_types::ids::{ DraftId, ProjectId, UserId };
use serde_json::Value;

/// Review state of a draft, independent of its lock state.
#[ derive( Debug, Clone, Copy, PartialEq, Eq ) ]
pub enum DraftStatus
{
  /// Open for editing by its owner.
  Draft,
  /// Submitted for manager review; no longer editable by the owner.
  Pending,
  /// Approved by a manager. Terminal.
  Approved,
  /// Rejected by a manager. Terminal.
  Rejected,
}

impl DraftStatus
{
  /// Wire representation used in the HTTP surface.
  #[must_use]
  pub fn as_str( &self ) -> &'static str
  {
    match self
    {
      Self::Draft => "draft",
      Self::Pending => "pending",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
    }
  }
}

/// A workbench draft row, including its current lock state.
#[ derive( Debug, Clone ) ]
pub struct Draft
{
  /// Unique identifier.
  pub draft_id: DraftId,
  /// Project / authorization scope the draft belongs to.
  pub project_id: ProjectId,
  /// The principal who created the draft and may submit it.
  pub owner_id: UserId,
  /// Human-readable title, set at creation.
  pub title: String,
  /// Review state.
  pub status: DraftStatus,
  /// Structured content payload.
  pub content: Value,
  /// Opaque identifier of the model/runtime configuration the content was
  /// last authored or tested against, if any. Carried for drift detection;
  /// nothing in this crate currently populates it past `None`.
  pub runtime_fingerprint: Option< String >,
  /// True once the draft has been soft-deleted. Soft-deleted drafts are not
  /// purged; they are excluded from listings by callers that check the flag.
  pub deleted: bool,
  /// Current lock holder, if any. Must be consulted alongside `lock_expires_at`.
  pub locked_by: Option< UserId >,
  /// When the current lock expires. Meaningless if `locked_by` is `None`.
  pub lock_expires_at: Option< DateTime< Utc > >,
  /// When the draft was created.
  pub created_at: DateTime< Utc >,
  /// When the draft row was last modified (content, status, or lock state).
  pub updated_at: DateTime< Utc >,
}

impl Draft
{
  /// True if `locked_by` names `user_id` and the lock has not expired as of `now`.
  #[must_use]
  pub fn is_locked_by( &self, user_id: &UserId, now: DateTime< Utc > ) -> bool
  {
    match ( &self.locked_by, self.lock_expires_at )
    {
      ( Some( holder ), Some( expires_at ) ) => holder == user_id && now < expires_at,
      _ => false,
    }
  }

  /// True if the draft is unlocked, or locked but the lock has expired.
  #[must_use]
  pub fn is_available( &self, now: DateTime< Utc > ) -> bool
  {
    match self.lock_expires_at
    {
      Some( expires_at ) => now >= expires_at,
      None => true,
    }
  }
}
