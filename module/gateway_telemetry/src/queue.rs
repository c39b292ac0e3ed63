//! Bounded, fire-and-forget telemetry queue.
//!
//! Fire-and-forget is a correctness requirement here, not a tuning knob: a
//! full queue drops the record and increments a counter rather than blocking
//! the request path, because availability of the hot path outranks
//! completeness of the audit log.

use crate::record::TelemetryRecord;
use crate::sink::{ AuditSink, DeadLetterSink };
use std::sync::atomic::{ AtomicU64, Ordering };
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{ mpsc, Mutex };
use tokio::task::JoinHandle;

/// Producer handle: `enqueue` never blocks and never fails the caller.
#[ derive( Debug, Clone ) ]
pub struct TelemetryQueue
{
  sender: mpsc::Sender< TelemetryRecord >,
  dropped: Arc< AtomicU64 >,
}

impl TelemetryQueue
{
  /// Offer `record` to the queue. Returns `true` if accepted, `false` if the
  /// queue was full and the record was dropped (the `telemetry_dropped`
  /// counter is incremented either way the caller can observe via
  /// [`Self::dropped_count`]). Never blocks.
  pub fn enqueue( &self, record: TelemetryRecord ) -> bool
  {
    match self.sender.try_send( record )
    {
      Ok( () ) => true,
      Err( _ ) =>
      {
        self.dropped.fetch_add( 1, Ordering::Relaxed );
        false
      }
    }
  }

  /// Total records dropped because the queue was full, since this handle was built.
  #[must_use]
  pub fn dropped_count( &self ) -> u64
  {
    self.dropped.load( Ordering::Relaxed )
  }
}

/// Configuration for the consumer pool.
#[ derive( Debug, Clone ) ]
pub struct WorkerConfig
{
  /// Queue capacity; beyond this, [`TelemetryQueue::enqueue`] drops.
  pub capacity: usize,
  /// Number of concurrent consumer workers.
  pub worker_count: usize,
  /// Maximum write attempts per record before it goes to the dead-letter sink.
  pub max_attempts: u32,
  /// Base delay for exponential backoff between retries.
  pub base_backoff: Duration,
}

impl Default for WorkerConfig
{
  fn default() -> Self
  {
    Self { capacity: 1024, worker_count: 4, max_attempts: 5, base_backoff: Duration::from_millis( 50 ) }
  }
}

/// Spawn the consumer pool and return the producer handle plus the worker
/// join handles (needed by [`shutdown`]).
pub fn spawn( config: WorkerConfig, sink: Arc< dyn AuditSink >, dead_letter: Arc< dyn DeadLetterSink > ) -> ( TelemetryQueue, Vec< JoinHandle< () > > )
{
  let ( sender, receiver ) = mpsc::channel( config.capacity );
  let receiver = Arc::new( Mutex::new( receiver ) );
  let dropped = Arc::new( AtomicU64::new( 0 ) );

  let handles = ( 0..config.worker_count )
  .map( | _ |
  {
    let receiver = receiver.clone();
    let sink = sink.clone();
    let dead_letter = dead_letter.clone();
    let max_attempts = config.max_attempts;
    let base_backoff = config.base_backoff;

    tokio::spawn( async move
    {
      loop
      {
        let record = { receiver.lock().await.recv().await };
        let Some( record ) = record else { break };
        write_with_retry( &record, sink.as_ref(), dead_letter.as_ref(), max_attempts, base_backoff ).await;
      }
    } )
  } )
  .collect();

  ( TelemetryQueue { sender, dropped }, handles )
}

async fn write_with_retry( record: &TelemetryRecord, sink: &dyn AuditSink, dead_letter: &dyn DeadLetterSink, max_attempts: u32, base_backoff: Duration )
{
  let mut attempt = 0u32;
  loop
  {
    match sink.write( record ).await
    {
      Ok( () ) => return,
      Err( error ) =>
      {
        attempt += 1;
        if attempt >= max_attempts
        {
          tracing::warn!( record_id = %record.record_id, attempts = attempt, error = %error, "telemetry write exhausted retries, dead-lettering" );
          dead_letter.write( record.clone() ).await;
          return;
        }
        tokio::time::sleep( base_backoff * 2u32.saturating_pow( attempt - 1 ) ).await;
      }
    }
  }
}

/// Stop accepting new records and drain buffered ones for up to `grace`
/// before discarding whatever remains in flight.
///
/// Consuming `queue` drops its sender, which lets each worker's `recv()`
/// return `None` once the channel drains so they can exit on their own.
pub async fn shutdown( queue: TelemetryQueue, handles: Vec< JoinHandle< () > >, grace: Duration )
{
  drop( queue );

  let drain = async
  {
    for handle in handles
    {
      let _ = handle.await;
    }
  };

  if tokio::time::timeout( grace, drain ).await.is_err()
  {
    tracing::warn!( "telemetry queue shutdown grace period elapsed, discarding in-flight records" );
  }
}

#[ cfg( test ) ]
mod tests
{
  use super::*;
  use crate::sink::{ InMemoryAuditSink, InMemoryDeadLetterSink };
  use serde_json::json;

  #[ tokio::test ]
  async fn enqueued_record_is_written_by_a_worker()
  {
    let audit = Arc::new( InMemoryAuditSink::new() );
    let dead_letter = Arc::new( InMemoryDeadLetterSink::new() );
    let ( queue, handles ) = spawn( WorkerConfig::default(), audit.clone(), dead_letter );

    let record = TelemetryRecord::new( chrono::Utc::now(), json!( { "ok": true } ) );
    assert!( queue.enqueue( record ) );

    shutdown( queue, handles, Duration::from_secs( 1 ) ).await;
    assert_eq!( audit.len(), 1 );
  }

  #[ tokio::test ]
  async fn full_queue_drops_and_counts()
  {
    let audit = Arc::new( InMemoryAuditSink::new() );
    let dead_letter = Arc::new( InMemoryDeadLetterSink::new() );
    let config = WorkerConfig { capacity: 1, worker_count: 0, ..WorkerConfig::default() };
    let ( queue, handles ) = spawn( config, audit, dead_letter );

    assert!( queue.enqueue( TelemetryRecord::new( chrono::Utc::now(), json!( {} ) ) ) );
    assert!( !queue.enqueue( TelemetryRecord::new( chrono::Utc::now(), json!( {} ) ) ) );
    assert_eq!( queue.dropped_count(), 1 );

    shutdown( queue, handles, Duration::from_millis( 10 ) ).await;
  }

  struct AlwaysFailsSink;

  #[ async_trait::async_trait ]
  impl AuditSink for AlwaysFailsSink
  {
    async fn write( &self, _record: &TelemetryRecord ) -> Result< (), crate::sink::SinkError >
    {
      Err( crate::sink::SinkError( "boom".into() ) )
    }
  }

  #[ tokio::test ]
  async fn exhausted_retries_land_in_dead_letter()
  {
    let dead_letter = Arc::new( InMemoryDeadLetterSink::new() );
    let config = WorkerConfig { max_attempts: 2, base_backoff: Duration::from_millis( 1 ), ..WorkerConfig::default() };
    let ( queue, handles ) = spawn( config, Arc::new( AlwaysFailsSink ), dead_letter.clone() );

    queue.enqueue( TelemetryRecord::new( chrono::Utc::now(), json!( {} ) ) );
    shutdown( queue, handles, Duration::from_secs( 1 ) ).await;

    assert_eq!( dead_letter.len(), 1 );
  }
}
