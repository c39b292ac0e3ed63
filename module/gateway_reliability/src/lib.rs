//! Inference proxy and circuit breaker: the resilience boundary between the
//! governance pipeline and upstream model providers.
//!
//! [`proxy::InferenceProxy`] forces deterministic call parameters
//! (temperature 0.0, a fixed default seed) and gates every call through a
//! per-model [`breaker::CircuitBreaker`] so a failing provider degrades to
//! fast, cheap failures instead of piling up timeouts.

#![cfg_attr(not(feature = "enabled"), allow(unused))]

#[ cfg( feature = "enabled" ) ]
pub mod breaker;
#[ cfg( feature = "enabled" ) ]
pub mod error;
#[ cfg( feature = "enabled" ) ]
pub mod proxy;

#[ cfg( feature = "enabled" ) ]
pub use breaker::{ CircuitBreaker, CircuitState };
#[ cfg( feature = "enabled" ) ]
pub use error::InferenceError;
#[ cfg( feature = "enabled" ) ]
pub use proxy::{ provider_for_model, BackendResponse, HttpModelBackend, InferenceOutcome, InferenceProxy, ModelBackend };
