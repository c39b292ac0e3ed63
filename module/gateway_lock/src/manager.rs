//! Pessimistic per-draft locking with a dead-man's-switch expiry.

use crate::draft::{ Draft, DraftStatus };
use crate::error::LockError;
use crate::lock::{ LockGrant, LockMode };
use crate::store::DraftStore;
use chrono::{ DateTime, Duration, Utc };
use gateway_types::ids::{ DraftId, ProjectId };
use gateway_types::Principal;
use serde_json::Value;
use std::sync::Arc;

/// A draft lock is held for this long from the moment it is granted or refreshed.
pub const LOCK_DURATION_SECS: i64 = 30;

/// The three transitions a draft can undergo after creation.
#[ derive( Debug, Clone, Copy, PartialEq, Eq ) ]
pub enum TransitionVerb
{
  /// Owner moves the draft from `Draft` to `Pending`.
  Submit,
  /// Manager moves a `Pending` draft to `Approved`.
  Approve,
  /// Manager moves a `Pending` draft to `Rejected`.
  Reject,
}

/// Manages draft lifecycle and the pessimistic edit lock protecting it.
///
/// Conflict is assumed likely: a small set of engineers may edit the same
/// draft, so acquisition is pessimistic rather than optimistic, with the
/// 30-second expiry bounding how long a crashed client can occupy a draft.
#[ derive( Debug, Clone ) ]
pub struct LockManager< S: DraftStore >
{
  store: Arc< S >,
}

impl< S: DraftStore > LockManager< S >
{
  /// Build a manager over the given store.
  pub fn new( store: Arc< S > ) -> Self
  {
    Self { store }
  }

  /// Create a new draft, owned by `owner_id`, unlocked.
  ///
  /// # Errors
  ///
  /// Propagates storage failures.
  pub async fn create_draft( &self, project_id: ProjectId, owner_id: gateway_types::ids::UserId, title: String, content: Value, now: DateTime< Utc > ) -> Result< DraftId, LockError >
  {
    let draft_id = DraftId::generate();
    let draft = Draft
    {
      draft_id: draft_id.clone(),
      project_id,
      owner_id,
      title,
      status: DraftStatus::Draft,
      content,
      runtime_fingerprint: None,
      deleted: false,
      locked_by: None,
      lock_expires_at: None,
      created_at: now,
      updated_at: now,
    };
    self.store.create( draft ).await?;
    Ok( draft_id )
  }

  /// Mark a draft as soft-deleted. Only the owner may do this, and only
  /// while the draft has not yet been submitted for review.
  ///
  /// # Errors
  ///
  /// [`LockError::NotFound`], [`LockError::Forbidden`] if `principal` does
  /// not own the draft, or [`LockError::Conflict`] if the draft is not in
  /// the `Draft` status.
  pub async fn soft_delete( &self, draft_id: &DraftId, principal: &Principal, now: DateTime< Utc > ) -> Result< (), LockError >
  {
    let mut draft = self.store.lock_row( draft_id ).await?;

    if draft.owner_id != principal.user_id
    {
      return Err( LockError::Forbidden );
    }
    if draft.status != DraftStatus::Draft
    {
      return Err( LockError::Conflict );
    }

    draft.deleted = true;
    draft.updated_at = now;
    Ok( () )
  }

  /// List drafts in a project, without acquiring any lock.
  ///
  /// # Errors
  ///
  /// Propagates storage failures.
  pub async fn list_drafts( &self, project_id: &ProjectId ) -> Result< Vec< Draft >, LockError >
  {
    self.store.list_by_project( project_id ).await
  }

  /// Fetch a draft's current row without touching its lock state.
  ///
  /// # Errors
  ///
  /// [`LockError::NotFound`] if the draft does not exist.
  pub async fn get_draft( &self, draft_id: &DraftId ) -> Result< Draft, LockError >
  {
    let draft = self.store.lock_row( draft_id ).await?;
    Ok( draft.clone() )
  }

  /// Acquire the edit lock, or fall back to a manager's safe-view.
  ///
  /// # Errors
  ///
  /// [`LockError::NotFound`] if the draft does not exist; [`LockError::LockConflict`]
  /// if the lock is held by someone else and `principal` is not a manager.
  pub async fn acquire( &self, draft_id: &DraftId, principal: &Principal, now: DateTime< Utc > ) -> Result< LockGrant, LockError >
  {
    let mut draft = self.store.lock_row( draft_id ).await?;

    if draft.is_available( now ) || draft.is_locked_by( &principal.user_id, now )
    {
      draft.locked_by = Some( principal.user_id.clone() );
      draft.lock_expires_at = Some( now + Duration::seconds( LOCK_DURATION_SECS ) );
      return Ok( LockGrant { mode: LockMode::Edit, holder: None } );
    }

    if principal.is_manager()
    {
      return Ok( LockGrant { mode: LockMode::SafeView, holder: draft.locked_by.clone() } );
    }

    Err( LockError::LockConflict { holder: draft.locked_by.clone().expect( "unavailable lock always has a holder" ) } )
  }

  /// Refresh the lock's expiry. Only the current holder may do this.
  ///
  /// # Errors
  ///
  /// [`LockError::NotFound`] if the draft does not exist; [`LockError::LockConflict`]
  /// if `principal` does not currently hold the lock.
  pub async fn heartbeat( &self, draft_id: &DraftId, principal: &Principal, now: DateTime< Utc > ) -> Result< (), LockError >
  {
    let mut draft = self.store.lock_row( draft_id ).await?;

    if !draft.is_locked_by( &principal.user_id, now )
    {
      return Err( lock_conflict( &draft ) );
    }

    draft.lock_expires_at = Some( now + Duration::seconds( LOCK_DURATION_SECS ) );
    Ok( () )
  }

  /// Replace the draft's content. Requires a currently-held lock.
  ///
  /// # Errors
  ///
  /// [`LockError::NotFound`], or [`LockError::LockConflict`] if `principal`
  /// does not hold the lock.
  pub async fn update( &self, draft_id: &DraftId, principal: &Principal, new_content: Value, now: DateTime< Utc > ) -> Result< (), LockError >
  {
    let mut draft = self.store.lock_row( draft_id ).await?;

    if !draft.is_locked_by( &principal.user_id, now )
    {
      return Err( lock_conflict( &draft ) );
    }

    draft.content = new_content;
    draft.updated_at = now;
    Ok( () )
  }

  /// Move the draft through the review state machine.
  ///
  /// `submit` requires ownership; `approve`/`reject` require the `Manager`
  /// role and the draft currently being `Pending`.
  ///
  /// # Errors
  ///
  /// [`LockError::NotFound`], [`LockError::Forbidden`] if the principal is
  /// not authorized for the verb, or [`LockError::Conflict`] if the draft's
  /// current status does not allow the transition.
  pub async fn transition( &self, draft_id: &DraftId, principal: &Principal, verb: TransitionVerb, now: DateTime< Utc > ) -> Result< (), LockError >
  {
    let mut draft = self.store.lock_row( draft_id ).await?;

    match verb
    {
      TransitionVerb::Submit =>
      {
        if draft.owner_id != principal.user_id
        {
          return Err( LockError::Forbidden );
        }
        if draft.status != DraftStatus::Draft
        {
          return Err( LockError::Conflict );
        }
        draft.status = DraftStatus::Pending;
      }
      TransitionVerb::Approve | TransitionVerb::Reject =>
      {
        if !principal.is_manager()
        {
          return Err( LockError::Forbidden );
        }
        if draft.status != DraftStatus::Pending
        {
          return Err( LockError::Conflict );
        }
        draft.status = if verb == TransitionVerb::Approve { DraftStatus::Approved } else { DraftStatus::Rejected };
      }
    }

    draft.updated_at = now;
    Ok( () )
  }
}

fn lock_conflict( draft: &Draft ) -> LockError
{
  match &draft.locked_by
  {
    Some( holder ) => LockError::LockConflict { holder: holder.clone() },
    None => LockError::Forbidden,
  }
}

#[ cfg( test ) ]
mod tests
{
  use super::*;
  use crate::store::InMemoryDraftStore;
  use gateway_types::ids::UserId;
  use gateway_types::Role;
  use serde_json::json;
  use std::collections::BTreeSet;

  fn developer( user_id: UserId ) -> Principal
  {
    Principal { user_id, email: "d@example.com".into(), groups: BTreeSet::new(), projects: BTreeSet::new(), roles: [ Role::Developer ].into_iter().collect() }
  }

  fn manager_principal( user_id: UserId ) -> Principal
  {
    Principal { user_id, email: "m@example.com".into(), groups: BTreeSet::new(), projects: BTreeSet::new(), roles: [ Role::Manager ].into_iter().collect() }
  }

  async fn seeded_manager() -> ( LockManager< InMemoryDraftStore >, DraftId )
  {
    let manager = LockManager::new( Arc::new( InMemoryDraftStore::new() ) );
    let draft_id = manager.create_draft( ProjectId::generate(), UserId::generate(), "untitled".into(), json!( {} ), Utc::now() ).await.unwrap();
    ( manager, draft_id )
  }

  #[ tokio::test ]
  async fn first_acquire_grants_edit()
  {
    let ( manager, draft_id ) = seeded_manager().await;
    let a = developer( UserId::generate() );
    let now = Utc::now();

    let grant = manager.acquire( &draft_id, &a, now ).await.unwrap();
    assert_eq!( grant.mode, LockMode::Edit );
  }

  #[ test ]
  fn lock_mode_eq_is_derived()
  {
    assert_eq!( LockMode::Edit, LockMode::Edit );
  }

  #[ tokio::test ]
  async fn second_developer_gets_conflict_manager_gets_safe_view()
  {
    let ( manager, draft_id ) = seeded_manager().await;
    let a = developer( UserId::generate() );
    let b = developer( UserId::generate() );
    let m = manager_principal( UserId::generate() );
    let now = Utc::now();

    manager.acquire( &draft_id, &a, now ).await.unwrap();

    let err = manager.acquire( &draft_id, &b, now ).await.unwrap_err();
    assert!( matches!( err, LockError::LockConflict { holder } if holder == a.user_id ) );

    let grant = manager.acquire( &draft_id, &m, now ).await.unwrap();
    assert_eq!( grant.mode, LockMode::SafeView );
    assert_eq!( grant.holder, Some( a.user_id.clone() ) );
  }

  #[ tokio::test ]
  async fn manager_safe_view_does_not_mutate_lock()
  {
    let ( mgr, draft_id ) = seeded_manager().await;
    let a = developer( UserId::generate() );
    let m = manager_principal( UserId::generate() );
    let now = Utc::now();

    mgr.acquire( &draft_id, &a, now ).await.unwrap();
    mgr.acquire( &draft_id, &m, now ).await.unwrap();

    // b still cannot acquire because the lock is unchanged by the safe-view read
    let b = developer( UserId::generate() );
    let err = mgr.acquire( &draft_id, &b, now ).await.unwrap_err();
    assert!( matches!( err, LockError::LockConflict { holder } if holder == a.user_id ) );
  }

  #[ tokio::test ]
  async fn expired_lock_is_reacquirable()
  {
    let ( manager, draft_id ) = seeded_manager().await;
    let a = developer( UserId::generate() );
    let b = developer( UserId::generate() );
    let now = Utc::now();

    manager.acquire( &draft_id, &a, now ).await.unwrap();

    let later = now + Duration::seconds( LOCK_DURATION_SECS + 1 );
    let grant = manager.acquire( &draft_id, &b, later ).await.unwrap();
    assert_eq!( grant.mode, LockMode::Edit );
  }

  #[ tokio::test ]
  async fn update_requires_lock_ownership()
  {
    let ( manager, draft_id ) = seeded_manager().await;
    let a = developer( UserId::generate() );
    let b = developer( UserId::generate() );
    let now = Utc::now();

    manager.acquire( &draft_id, &a, now ).await.unwrap();

    let err = manager.update( &draft_id, &b, json!( { "x": 1 } ), now ).await.unwrap_err();
    assert!( matches!( err, LockError::LockConflict { .. } ) );

    manager.update( &draft_id, &a, json!( { "x": 1 } ), now ).await.unwrap();
  }

  #[ tokio::test ]
  async fn submit_requires_ownership_then_manager_approves()
  {
    let owner = UserId::generate();
    let store = Arc::new( InMemoryDraftStore::new() );
    let lock_manager = LockManager::new( store );
    let now = Utc::now();
    let draft_id = lock_manager.create_draft( ProjectId::generate(), owner.clone(), "untitled".into(), json!( {} ), now ).await.unwrap();

    let not_owner = developer( UserId::generate() );
    let err = lock_manager.transition( &draft_id, &not_owner, TransitionVerb::Submit, now ).await.unwrap_err();
    assert_eq!( err, LockError::Forbidden );

    let owner_principal = developer( owner );
    lock_manager.transition( &draft_id, &owner_principal, TransitionVerb::Submit, now ).await.unwrap();

    let reviewer = manager_principal( UserId::generate() );
    lock_manager.transition( &draft_id, &reviewer, TransitionVerb::Approve, now ).await.unwrap();

    let err = lock_manager.transition( &draft_id, &reviewer, TransitionVerb::Approve, now ).await.unwrap_err();
    assert_eq!( err, LockError::Conflict );
  }

  #[ tokio::test ]
  async fn soft_delete_requires_ownership_and_draft_status()
  {
    let owner = UserId::generate();
    let store = Arc::new( InMemoryDraftStore::new() );
    let lock_manager = LockManager::new( store );
    let now = Utc::now();
    let draft_id = lock_manager.create_draft( ProjectId::generate(), owner.clone(), "untitled".into(), json!( {} ), now ).await.unwrap();

    let not_owner = developer( UserId::generate() );
    let err = lock_manager.soft_delete( &draft_id, &not_owner, now ).await.unwrap_err();
    assert_eq!( err, LockError::Forbidden );

    let owner_principal = developer( owner );
    lock_manager.soft_delete( &draft_id, &owner_principal, now ).await.unwrap();

    let draft = lock_manager.get_draft( &draft_id ).await.unwrap();
    assert!( draft.deleted );
  }
}
