//! Per-model three-state circuit breaker.

use std::collections::{ HashMap, VecDeque };
use std::sync::Mutex;
use std::time::{ Duration, Instant };

/// Circuit state for one model.
#[ derive( Debug, Clone, Copy, PartialEq, Eq ) ]
pub enum CircuitState
{
  /// Calls pass; failures are counted within the sliding window.
  Closed,
  /// All calls fail immediately until the cooldown elapses.
  Open,
  /// Cooldown elapsed; exactly one probe call is let through.
  HalfOpen,
}

struct ModelCircuit
{
  state: CircuitState,
  opened_at: Instant,
  failures: VecDeque< Instant >,
  probe_in_flight: bool,
}

impl ModelCircuit
{
  fn new() -> Self
  {
    Self { state: CircuitState::Closed, opened_at: Instant::now(), failures: VecDeque::new(), probe_in_flight: false }
  }
}

/// A circuit breaker keyed per model name.
///
/// Closed → Open when the sliding window accumulates `failure_threshold`
/// failures; Open → Half-Open after `cooldown` elapses; Half-Open admits one
/// probe call and transitions to Closed on success or back to Open
/// (resetting the cooldown) on failure.
#[ derive( Debug ) ]
pub struct CircuitBreaker
{
  circuits: Mutex< HashMap< String, ModelCircuit > >,
  failure_threshold: u32,
  window: Duration,
  cooldown: Duration,
}

impl CircuitBreaker
{
  /// Build a breaker with the given failure threshold, sliding window, and
  /// open-state cooldown.
  #[must_use]
  pub fn new( failure_threshold: u32, window: Duration, cooldown: Duration ) -> Self
  {
    Self { circuits: Mutex::new( HashMap::new() ), failure_threshold, window, cooldown }
  }

  /// Build a breaker using the governance spec defaults: 5 failures in a
  /// 10-second window trips a 60-second open state.
  #[must_use]
  pub fn with_defaults() -> Self
  {
    Self::new( 5, Duration::from_secs( 10 ), Duration::from_secs( 60 ) )
  }

  /// Whether a call for `model` may proceed right now.
  ///
  /// Transitions Open → Half-Open internally once the cooldown has elapsed,
  /// and admits exactly one in-flight probe per Half-Open period.
  pub fn allow( &self, model: &str ) -> bool
  {
    let mut circuits = self.circuits.lock().unwrap_or_else( std::sync::PoisonError::into_inner );
    let circuit = circuits.entry( model.to_string() ).or_insert_with( ModelCircuit::new );

    match circuit.state
    {
      CircuitState::Closed => true,
      CircuitState::Open =>
      {
        if circuit.opened_at.elapsed() >= self.cooldown
        {
          circuit.state = CircuitState::HalfOpen;
          circuit.probe_in_flight = true;
          true
        }
        else
        {
          false
        }
      }
      CircuitState::HalfOpen =>
      {
        if circuit.probe_in_flight
        {
          false
        }
        else
        {
          circuit.probe_in_flight = true;
          true
        }
      }
    }
  }

  /// Record a successful call for `model`.
  pub fn record_success( &self, model: &str )
  {
    let mut circuits = self.circuits.lock().unwrap_or_else( std::sync::PoisonError::into_inner );
    let circuit = circuits.entry( model.to_string() ).or_insert_with( ModelCircuit::new );
    circuit.state = CircuitState::Closed;
    circuit.failures.clear();
    circuit.probe_in_flight = false;
  }

  /// Record a failed call for `model`. A failure during Half-Open reopens the
  /// circuit and resets the cooldown; a failure during Closed only trips the
  /// breaker once the sliding window accumulates `failure_threshold` entries.
  pub fn record_failure( &self, model: &str )
  {
    let now = Instant::now();
    let mut circuits = self.circuits.lock().unwrap_or_else( std::sync::PoisonError::into_inner );
    let circuit = circuits.entry( model.to_string() ).or_insert_with( ModelCircuit::new );

    if circuit.state == CircuitState::HalfOpen
    {
      circuit.state = CircuitState::Open;
      circuit.opened_at = now;
      circuit.probe_in_flight = false;
      circuit.failures.clear();
      return;
    }

    circuit.failures.push_back( now );
    while let Some( &front ) = circuit.failures.front()
    {
      if now.duration_since( front ) > self.window
      {
        circuit.failures.pop_front();
      }
      else
      {
        break;
      }
    }

    if circuit.failures.len() as u32 >= self.failure_threshold
    {
      circuit.state = CircuitState::Open;
      circuit.opened_at = now;
      circuit.failures.clear();
    }
  }
}

#[ cfg( test ) ]
mod tests
{
  use super::*;

  #[ test ]
  fn closed_allows_calls_until_threshold()
  {
    let cb = CircuitBreaker::new( 3, Duration::from_secs( 10 ), Duration::from_secs( 60 ) );
    assert!( cb.allow( "gpt-4o" ) );
    cb.record_failure( "gpt-4o" );
    cb.record_failure( "gpt-4o" );
    assert!( cb.allow( "gpt-4o" ) );
    cb.record_failure( "gpt-4o" );
    assert!( !cb.allow( "gpt-4o" ) );
  }

  #[ test ]
  fn half_open_admits_single_probe()
  {
    let cb = CircuitBreaker::new( 1, Duration::from_secs( 10 ), Duration::from_millis( 1 ) );
    cb.record_failure( "gpt-4o" );
    assert!( !cb.allow( "gpt-4o" ) );
    std::thread::sleep( Duration::from_millis( 5 ) );
    assert!( cb.allow( "gpt-4o" ) );
    assert!( !cb.allow( "gpt-4o" ) );
  }

  #[ test ]
  fn half_open_success_closes_circuit()
  {
    let cb = CircuitBreaker::new( 1, Duration::from_secs( 10 ), Duration::from_millis( 1 ) );
    cb.record_failure( "gpt-4o" );
    std::thread::sleep( Duration::from_millis( 5 ) );
    assert!( cb.allow( "gpt-4o" ) );
    cb.record_success( "gpt-4o" );
    assert!( cb.allow( "gpt-4o" ) );
  }

  #[ test ]
  fn half_open_failure_reopens_and_resets_cooldown()
  {
    let cb = CircuitBreaker::new( 1, Duration::from_secs( 10 ), Duration::from_millis( 20 ) );
    cb.record_failure( "gpt-4o" );
    std::thread::sleep( Duration::from_millis( 25 ) );
    assert!( cb.allow( "gpt-4o" ) );
    cb.record_failure( "gpt-4o" );
    assert!( !cb.allow( "gpt-4o" ) );
  }

  #[ test ]
  fn independent_models_do_not_share_state()
  {
    let cb = CircuitBreaker::new( 1, Duration::from_secs( 10 ), Duration::from_secs( 60 ) );
    cb.record_failure( "gpt-4o" );
    assert!( !cb.allow( "gpt-4o" ) );
    assert!( cb.allow( "claude-3-5-sonnet" ) );
  }
}
