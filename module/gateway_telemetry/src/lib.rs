//! Structured logging plus the bounded, fire-and-forget telemetry queue.
//!
//! [`queue::TelemetryQueue::enqueue`] never blocks the request path: on a
//! full queue the record is dropped and counted rather than applying
//! backpressure, because availability of the hot path outranks completeness
//! of the audit log. A fixed pool of workers drains the queue, retrying
//! transient write failures with exponential backoff before giving up to a
//! [`sink::DeadLetterSink`].

#![cfg_attr(not(feature = "enabled"), allow(unused))]

#[ cfg( feature = "enabled" ) ]
pub mod logging;
#[ cfg( feature = "enabled" ) ]
pub mod queue;
#[ cfg( feature = "enabled" ) ]
pub mod record;
#[ cfg( feature = "enabled" ) ]
pub mod sink;

#[ cfg( feature = "enabled" ) ]
pub use logging::{ init_logging, log_budget_overrun, log_circuit_open, log_telemetry_dropped, LogLevel };
#[ cfg( feature = "enabled" ) ]
pub use queue::{ shutdown, spawn, TelemetryQueue, WorkerConfig };
#[ cfg( feature = "enabled" ) ]
pub use record::TelemetryRecord;
#[ cfg( feature = "enabled" ) ]
pub use sink::{ AuditSink, DeadLetterSink, InMemoryAuditSink, InMemoryDeadLetterSink, SinkError };
