//! Error types for the inference proxy.

/// Failures [`crate::proxy::InferenceProxy::invoke`] can report.
#[ derive( Debug, Clone, thiserror::Error ) ]
pub enum InferenceError
{
  /// The model's circuit breaker is open; the call was rejected without
  /// reaching the network.
  #[ error( "circuit open for model" ) ]
  CircuitOpen,

  /// The upstream call did not complete within its deadline. Counts against
  /// the circuit breaker.
  #[ error( "upstream call timed out" ) ]
  Timeout,

  /// The upstream returned a 5xx. Counts against the circuit breaker.
  #[ error( "upstream server error: {0}" ) ]
  ServerError( u16 ),

  /// The call failed before a response was received (DNS, TLS, connect).
  /// Counts against the circuit breaker.
  #[ error( "upstream connection error: {0}" ) ]
  ConnectionError( String ),

  /// The upstream returned a 4xx. Does not trip the circuit breaker — a
  /// malformed or rejected request is the caller's fault, not the
  /// provider's unavailability.
  #[ error( "upstream rejected request: {status}: {body}" ) ]
  ClientError
  {
    /// HTTP status code returned by the upstream.
    status: u16,
    /// Upstream-reported error body, truncated for logging.
    body: String,
  },
}

impl InferenceError
{
  /// True if this failure should count against the circuit breaker's sliding window.
  #[must_use]
  pub fn counts_as_breaker_failure( &self ) -> bool
  {
    !matches!( self, Self::ClientError { .. } | Self::CircuitOpen )
  }
}
