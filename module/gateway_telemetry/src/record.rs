//! The telemetry record shape carried through the queue.

use chrono::{ DateTime, Utc };
use gateway_types::ids::RecordId;
use serde_json::Value;

/// One audit entry for a governed request.
///
/// Built from scrubbed request/response values only — see [Invariant A in
/// the governance pipeline](../gateway_pipeline). Carries its own wall-clock
/// timestamp because the queue promises no cross-record ordering.
#[ derive( Debug, Clone ) ]
pub struct TelemetryRecord
{
  /// Unique id for this record, used as the idempotency key by the audit sink.
  pub record_id: RecordId,
  /// Wall-clock time the producing request observed, not when this record is written.
  pub recorded_at: DateTime< Utc >,
  /// Scrubbed payload: request/response content, cost, latency, and categorical metadata.
  pub payload: Value,
}

impl TelemetryRecord
{
  /// Build a new record with a freshly generated id.
  #[must_use]
  pub fn new( recorded_at: DateTime< Utc >, payload: Value ) -> Self
  {
    Self { record_id: RecordId::generate(), recorded_at, payload }
  }
}
