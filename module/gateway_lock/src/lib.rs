//! Pessimistic locking and review-state transitions for workbench drafts.
//!
//! Locks are held for [`manager::LOCK_DURATION_SECS`] and must be refreshed
//! with [`manager::LockManager::heartbeat`]; an unrefreshed lock expires on
//! its own, bounding how long a crashed client can occupy a draft.

#![cfg_attr(not(feature = "enabled"), allow(unused))]

#[ cfg( feature = "enabled" ) ]
pub mod draft;
#[ cfg( feature = "enabled" ) ]
pub mod error;
#[ cfg( feature = "enabled" ) ]
pub mod lock;
#[ cfg( feature = "enabled" ) ]
pub mod manager;
#[ cfg( feature = "enabled" ) ]
pub mod store;

#[ cfg( feature = "enabled" ) ]
pub use draft::{ Draft, DraftStatus };
#[ cfg( feature = "enabled" ) ]
pub use error::LockError;
#[ cfg( feature = "enabled" ) ]
pub use lock::{ LockGrant, LockMode };
#[ cfg( feature = "enabled" ) ]
pub use manager::{ LockManager, TransitionVerb, LOCK_DURATION_SECS };
#[ cfg( feature = "enabled" ) ]
pub use store::{ DraftGuard, DraftStore, InMemoryDraftStore };
