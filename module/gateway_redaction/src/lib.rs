//! Recursive PII detection and redaction over JSON-shaped request/response trees.
//!
//! [`scrub`] rebuilds an arbitrary JSON-shaped value bottom-up, replacing
//! every string's detected PII spans with `<REDACTED {ENTITY_TYPE}>` while
//! leaving non-string leaves and the tree's shape untouched. The engine
//! reaches every string reachable from the root, including strings nested
//! inside sequences or mappings of arbitrary depth.

#![cfg_attr(not(feature = "enabled"), allow(unused))]

#[ cfg( feature = "enabled" ) ]
pub mod detector;
#[ cfg( feature = "enabled" ) ]
pub mod engine;

#[ cfg( feature = "enabled" ) ]
pub use detector::{ Detector, EntityType, Span };
#[ cfg( feature = "enabled" ) ]
pub use engine::scrub;
