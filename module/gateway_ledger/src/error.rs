//! Error types for the budget ledger.

/// Failures the ledger can report. Every variant maps to a `gateway_types::GatewayError`
/// category at the pipeline boundary.
#[ derive( Debug, Clone, PartialEq, thiserror::Error ) ]
pub enum LedgerError
{
  /// The reservation would push the user's day spend over the configured limit.
  #[ error( "budget exceeded: spent {spent_micros} + requested {requested_micros} > limit {limit_micros} (micros)" ) ]
  BudgetExceeded
  {
    /// Already-committed-plus-reserved spend for the day, in microdollars.
    spent_micros: u64,
    /// Amount the caller asked to reserve, in microdollars.
    requested_micros: u64,
    /// Configured daily limit, in microdollars.
    limit_micros: u64,
  },

  /// No reservation exists with this id, or it has already reached a terminal state.
  #[ error( "unknown or already-settled reservation: {0}" ) ]
  UnknownReservation( String ),
}
