//! Structured logging setup for the gateway process.

use tracing::level_filters::LevelFilter;

/// Log level configuration.
#[ derive( Debug, Clone, Copy ) ]
pub enum LogLevel
{
  /// Verbose diagnostics, not for production.
  Debug,
  /// Normal operational events.
  Info,
  /// Recoverable anomalies worth a human's attention.
  Warn,
  /// Failures that require action.
  Error,
}

impl From< LogLevel > for LevelFilter
{
  fn from( level: LogLevel ) -> Self
  {
    match level
    {
      LogLevel::Debug => LevelFilter::DEBUG,
      LogLevel::Info => LevelFilter::INFO,
      LogLevel::Warn => LevelFilter::WARN,
      LogLevel::Error => LevelFilter::ERROR,
    }
  }
}

/// Initialize the process-wide tracing subscriber. Call once at startup.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_logging( level: LogLevel ) -> Result< (), Box< dyn std::error::Error > >
{
  use tracing_subscriber::FmtSubscriber;

  let subscriber = FmtSubscriber::builder()
  .with_max_level( level )
  .with_target( false )
  .with_thread_ids( true )
  .with_line_number( true )
  .finish();

  tracing::subscriber::set_global_default( subscriber )?;

  Ok( () )
}

/// Log a budget-overrun event: a commit exceeded its reservation's slack.
///
/// The category and amounts are never PII, so this is safe to emit even on
/// the failure path where no request payload is available.
pub fn log_budget_overrun( user_id: &str, reserved_micros: u64, actual_micros: u64 )
{
  tracing::warn!(
    user_id = %user_id,
    reserved_micros,
    actual_micros,
    "budget commit exceeded reservation slack"
  );
}

/// Log that the circuit breaker tripped open for a model.
pub fn log_circuit_open( model: &str )
{
  tracing::warn!( model = %model, "circuit breaker opened" );
}

/// Log that a telemetry record was dropped because the queue was full.
pub fn log_telemetry_dropped( dropped_total: u64 )
{
  tracing::warn!( dropped_total, "telemetry record dropped: queue full" );
}
