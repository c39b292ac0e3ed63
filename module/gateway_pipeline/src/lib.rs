//! The governance pipeline: orchestrates one chat request through
//! authorization, budget reservation, secret acquisition, inference,
//! redaction, reconciliation, and telemetry.
//!
//! See [`pipeline::GovernancePipeline::chat`] for the full chain and its
//! invariants: no unscrubbed content leaves via any exit path but the
//! originating response, and every reservation is either committed, refunded,
//! or auto-refunded by its expiry.

#![cfg_attr(not(feature = "enabled"), allow(unused))]

#[ cfg( feature = "enabled" ) ]
mod error;
#[ cfg( feature = "enabled" ) ]
pub mod pipeline;

#[ cfg( feature = "enabled" ) ]
pub use pipeline::GovernancePipeline;
