//! Storage abstraction for draft rows.

use crate::draft::Draft;
use crate::error::LockError;
use async_trait::async_trait;
use dashmap::DashMap;
use gateway_types::ids::{ DraftId, ProjectId };
use std::sync::Arc;
use tokio::sync::{ Mutex, OwnedMutexGuard };

/// An exclusive, held handle on one draft row.
///
/// Generalizes the spec's `SELECT … FOR UPDATE`: while a caller holds this
/// guard, no other caller can observe or mutate the same draft, so
/// read-then-write lock operations (`acquire`, `update`) are atomic.
pub type DraftGuard = OwnedMutexGuard< Draft >;

/// Backing store for drafts.
#[ async_trait ]
pub trait DraftStore: Send + Sync
{
  /// Insert a brand-new draft.
  async fn create( &self, draft: Draft ) -> Result< (), LockError >;

  /// List every draft belonging to `project_id`, in no particular order.
  async fn list_by_project( &self, project_id: &ProjectId ) -> Result< Vec< Draft >, LockError >;

  /// Acquire the row-level lock for `draft_id` and hold it until the guard drops.
  ///
  /// # Errors
  ///
  /// Returns [`LockError::NotFound`] if no draft with `draft_id` exists.
  async fn lock_row( &self, draft_id: &DraftId ) -> Result< DraftGuard, LockError >;
}

/// In-process [`DraftStore`] backed by one `tokio::sync::Mutex` per draft.
///
/// The outer `DashMap` is only ever touched to clone out the per-row `Arc`,
/// never held across an `.await`, so looking up one draft never blocks
/// operations on another.
#[ derive( Debug, Default ) ]
pub struct InMemoryDraftStore
{
  drafts: DashMap< DraftId, Arc< Mutex< Draft > > >,
}

impl InMemoryDraftStore
{
  /// Build an empty store.
  #[must_use]
  pub fn new() -> Self
  {
    Self::default()
  }
}

#[ async_trait ]
impl DraftStore for InMemoryDraftStore
{
  async fn create( &self, draft: Draft ) -> Result< (), LockError >
  {
    self.drafts.insert( draft.draft_id.clone(), Arc::new( Mutex::new( draft ) ) );
    Ok( () )
  }

  async fn list_by_project( &self, project_id: &ProjectId ) -> Result< Vec< Draft >, LockError >
  {
    let mut out = Vec::new();
    for entry in &self.drafts
    {
      let draft = entry.value().lock().await;
      if &draft.project_id == project_id
      {
        out.push( draft.clone() );
      }
    }
    Ok( out )
  }

  async fn lock_row( &self, draft_id: &DraftId ) -> Result< DraftGuard, LockError >
  {
    let row = self.drafts.get( draft_id ).map( | entry | entry.value().clone() );
    let Some( row ) = row else { return Err( LockError::NotFound ) };
    Ok( row.lock_owned().await )
  }
}
