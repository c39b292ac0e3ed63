//! Audit and dead-letter sinks for settled telemetry records.

use crate::record::TelemetryRecord;
use async_trait::async_trait;
use dashmap::DashMap;

/// A transient failure writing a record to the audit store.
#[ derive( Debug, Clone, PartialEq, Eq, thiserror::Error ) ]
#[ error( "{0}" ) ]
pub struct SinkError( pub String );

/// The durable audit store telemetry records are ultimately written to.
///
/// Writes must be idempotent keyed by `record_id`: the consumer retries on
/// transient failure, so the same record may be offered more than once.
#[ async_trait ]
pub trait AuditSink: Send + Sync
{
  /// Persist `record`. Calling this twice with the same `record_id` has the
  /// same effect as calling it once.
  async fn write( &self, record: &TelemetryRecord ) -> Result< (), SinkError >;
}

/// Sink for records that exhausted their retry budget.
#[ async_trait ]
pub trait DeadLetterSink: Send + Sync
{
  /// Record that `record` could not be persisted after retrying.
  async fn write( &self, record: TelemetryRecord );
}

/// In-memory [`AuditSink`] keyed by `record_id`, so repeated writes of the
/// same record are idempotent by construction. Useful for tests and as a
/// process-local store when no external audit backend is configured.
#[ derive( Debug, Default ) ]
pub struct InMemoryAuditSink
{
  written: DashMap< String, TelemetryRecord >,
}

impl InMemoryAuditSink
{
  /// Build an empty sink.
  #[must_use]
  pub fn new() -> Self
  {
    Self::default()
  }

  /// Number of distinct records persisted so far.
  #[must_use]
  pub fn len( &self ) -> usize
  {
    self.written.len()
  }

  /// True if no record has been persisted.
  #[must_use]
  pub fn is_empty( &self ) -> bool
  {
    self.written.is_empty()
  }
}

#[ async_trait ]
impl AuditSink for InMemoryAuditSink
{
  async fn write( &self, record: &TelemetryRecord ) -> Result< (), SinkError >
  {
    self.written.insert( record.record_id.to_string(), record.clone() );
    Ok( () )
  }
}

/// In-memory [`DeadLetterSink`], useful for tests and as a fallback when no
/// external dead-letter backend is configured.
#[ derive( Debug, Default ) ]
pub struct InMemoryDeadLetterSink
{
  records: DashMap< String, TelemetryRecord >,
}

impl InMemoryDeadLetterSink
{
  /// Build an empty sink.
  #[must_use]
  pub fn new() -> Self
  {
    Self::default()
  }

  /// Number of records that exhausted their retry budget.
  #[must_use]
  pub fn len( &self ) -> usize
  {
    self.records.len()
  }
}

#[ async_trait ]
impl DeadLetterSink for InMemoryDeadLetterSink
{
  async fn write( &self, record: TelemetryRecord )
  {
    self.records.insert( record.record_id.to_string(), record );
  }
}
