//! Race-free daily budget accounting.
//!
//! The ledger gates spend with a **reserve-then-reconcile** pattern: a caller
//! reserves a server-estimated amount before the true cost is known, then
//! commits (or refunds) once it is. The reservation is the enforcement point;
//! the commit records truth.
//!
//! ## Known pitfall: DashMap lock/iteration
//!
//! Never hold an `entry()` guard on one [`DashMap`] while calling a method
//! that iterates a *different* map and could re-enter the first — here,
//! `days` and `reservations` are separate maps and each method touches at
//! most one entry of each at a time, so no call ever iterates a map while
//! holding one of its own entry locks.

use crate::error::LedgerError;
use chrono::{ DateTime, Duration, NaiveDate, Utc };
use dashmap::DashMap;
use gateway_types::ids::{ ReservationId, UserId };
use std::collections::BTreeSet;

/// A short-lived token gating one in-flight request's spend.
///
/// Exactly one terminal transition happens per reservation: [`BudgetLedger::commit`]
/// or [`BudgetLedger::refund`], or — if neither is called before `expires_at` —
/// auto-refund on the next access to the same user/day key.
#[ derive( Debug, Clone, PartialEq, Eq ) ]
pub struct BudgetReservation
{
  /// Unique id for this reservation.
  pub id: ReservationId,
  /// User whose daily budget this reservation counts against.
  pub user_id: UserId,
  /// Amount reserved, in microdollars.
  pub amount_micros: u64,
  /// Deadline after which the reservation is eligible for auto-refund.
  pub expires_at: DateTime< Utc >,
  day: NaiveDate,
}

/// Result of a successful [`BudgetLedger::commit`].
#[ derive( Debug, Clone, Copy, PartialEq, Eq ) ]
pub struct CommitOutcome
{
  /// The amount actually applied to committed spend, in microdollars. Equal to
  /// `actual_micros` unless it exceeded the reservation plus slack, in which
  /// case it is clamped.
  pub applied_micros: u64,
  /// True if `actual_micros` exceeded the reservation's slack allowance and
  /// was clamped. The caller should emit a budget-overrun telemetry marker;
  /// the response to the end user is never failed because of it.
  pub overrun: bool,
}

#[ derive( Debug, Default ) ]
struct DayState
{
  committed_micros: u64,
  reserved_micros: u64,
  outstanding: BTreeSet< ReservationId >,
}

impl DayState
{
  fn current_total( &self ) -> u64
  {
    self.committed_micros.saturating_add( self.reserved_micros )
  }
}

type DayKey = ( UserId, NaiveDate );

/// Race-free, per-user daily spend ledger.
///
/// Every mutating call touches at most one [`DashMap`] entry per map, so
/// concurrent callers for *different* users never contend, and callers for the
/// *same* user serialize on that single entry's shard lock.
#[ derive( Debug ) ]
pub struct BudgetLedger
{
  days: DashMap< DayKey, DayState >,
  reservations: DashMap< ReservationId, BudgetReservation >,
  limit_micros: u64,
  grace: Duration,
  slack_micros: u64,
}

impl BudgetLedger
{
  /// Build a ledger with the given daily limit, reservation grace period, and
  /// commit-overrun slack allowance, all in microdollars (grace in seconds).
  #[must_use]
  pub fn new( limit_micros: u64, grace_seconds: i64, slack_micros: u64 ) -> Self
  {
    Self
    {
      days: DashMap::new(),
      reservations: DashMap::new(),
      limit_micros,
      grace: Duration::seconds( grace_seconds ),
      slack_micros,
    }
  }

  /// Reserve `amount_micros` against `user_id`'s spend for the day containing `now`.
  ///
  /// Sweeps and auto-refunds any of the user's reservations that expired
  /// before `now` first, then performs a single atomic check-and-increment:
  /// if `committed + reserved + amount_micros` would exceed the configured
  /// limit, no state is mutated and [`LedgerError::BudgetExceeded`] is returned.
  ///
  /// # Errors
  ///
  /// Returns [`LedgerError::BudgetExceeded`] if the reservation would exceed
  /// the daily limit.
  pub fn reserve( &self, user_id: &UserId, amount_micros: u64, now: DateTime< Utc > ) -> Result< BudgetReservation, LedgerError >
  {
    let day = now.date_naive();
    let key = ( user_id.clone(), day );

    let mut entry = self.days.entry( key ).or_insert_with( DayState::default );
    self.sweep_expired( &mut entry, now );

    let current = entry.current_total();
    if current.saturating_add( amount_micros ) > self.limit_micros
    {
      return Err( LedgerError::BudgetExceeded
      {
        spent_micros: current,
        requested_micros: amount_micros,
        limit_micros: self.limit_micros,
      } );
    }

    entry.reserved_micros = entry.reserved_micros.saturating_add( amount_micros );

    let reservation = BudgetReservation
    {
      id: ReservationId::generate(),
      user_id: user_id.clone(),
      amount_micros,
      expires_at: now + self.grace,
      day,
    };
    entry.outstanding.insert( reservation.id.clone() );
    drop( entry );

    self.reservations.insert( reservation.id.clone(), reservation.clone() );
    Ok( reservation )
  }

  /// Commit a reservation for its actual cost, in microdollars.
  ///
  /// `actual_micros` may differ from the reservation: amounts below it release
  /// the difference, amounts above it are absorbed up to the configured slack.
  /// Beyond slack, the applied amount clamps at `reserved + slack` and
  /// `overrun` is set, but this call never fails — the caller's response has
  /// already been served.
  ///
  /// # Errors
  ///
  /// Returns [`LedgerError::UnknownReservation`] if no such reservation is
  /// outstanding (already settled, or never issued).
  pub fn commit( &self, reservation_id: &ReservationId, actual_micros: u64 ) -> Result< CommitOutcome, LedgerError >
  {
    let ( _, reservation ) = self.reservations
    .remove( reservation_id )
    .ok_or_else( || LedgerError::UnknownReservation( reservation_id.to_string() ) )?;

    let allowed_max = reservation.amount_micros.saturating_add( self.slack_micros );
    let overrun = actual_micros > allowed_max;
    let applied = actual_micros.min( allowed_max );

    let key = ( reservation.user_id.clone(), reservation.day );
    let mut entry = self.days.entry( key ).or_insert_with( DayState::default );
    entry.reserved_micros = entry.reserved_micros.saturating_sub( reservation.amount_micros );
    entry.committed_micros = entry.committed_micros.saturating_add( applied );
    entry.outstanding.remove( &reservation.id );

    Ok( CommitOutcome { applied_micros: applied, overrun } )
  }

  /// Release a reservation in full without recording any spend.
  ///
  /// # Errors
  ///
  /// Returns [`LedgerError::UnknownReservation`] if no such reservation is
  /// outstanding (already settled, or never issued).
  pub fn refund( &self, reservation_id: &ReservationId ) -> Result< (), LedgerError >
  {
    let ( _, reservation ) = self.reservations
    .remove( reservation_id )
    .ok_or_else( || LedgerError::UnknownReservation( reservation_id.to_string() ) )?;

    let key = ( reservation.user_id.clone(), reservation.day );
    let mut entry = self.days.entry( key ).or_insert_with( DayState::default );
    entry.reserved_micros = entry.reserved_micros.saturating_sub( reservation.amount_micros );
    entry.outstanding.remove( &reservation.id );

    Ok( () )
  }

  /// Committed spend for `user_id` on the day containing `now`, in microdollars.
  #[must_use]
  pub fn committed_micros( &self, user_id: &UserId, now: DateTime< Utc > ) -> u64
  {
    let key = ( user_id.clone(), now.date_naive() );
    self.days.get( &key ).map_or( 0, | s | s.committed_micros )
  }

  /// Auto-refund every outstanding reservation for this day-state entry whose
  /// `expires_at` has already passed. Bounds the damage of a handler that
  /// reserved and then crashed before reaching commit or refund.
  fn sweep_expired( &self, entry: &mut DayState, now: DateTime< Utc > )
  {
    let expired: Vec< ReservationId > = entry.outstanding
    .iter()
    .filter( | id |
    {
      self.reservations.get( id ).is_none_or( | r | r.expires_at <= now )
    } )
    .cloned()
    .collect();

    for id in expired
    {
      if let Some( ( _, reservation ) ) = self.reservations.remove( &id )
      {
        entry.reserved_micros = entry.reserved_micros.saturating_sub( reservation.amount_micros );
      }
      entry.outstanding.remove( &id );
    }
  }
}

#[ cfg( test ) ]
mod tests
{
  use super::*;

  fn now() -> DateTime< Utc >
  {
    "2026-01-01T00:00:00Z".parse().unwrap()
  }

  #[ test ]
  fn reserve_within_limit_succeeds()
  {
    let ledger = BudgetLedger::new( 1_000_000, 300, 0 );
    let user = UserId::generate();
    let r = ledger.reserve( &user, 500_000, now() ).unwrap();
    assert_eq!( r.amount_micros, 500_000 );
  }

  #[ test ]
  fn reserve_over_limit_is_rejected_without_mutation()
  {
    let ledger = BudgetLedger::new( 1_000_000, 300, 0 );
    let user = UserId::generate();
    ledger.reserve( &user, 900_000, now() ).unwrap();
    let err = ledger.reserve( &user, 200_000, now() ).unwrap_err();
    assert!( matches!( err, LedgerError::BudgetExceeded { .. } ) );
    assert_eq!( ledger.committed_micros( &user, now() ), 0 );
  }

  #[ test ]
  fn commit_below_reservation_releases_difference()
  {
    let ledger = BudgetLedger::new( 1_000_000, 300, 0 );
    let user = UserId::generate();
    let r = ledger.reserve( &user, 500_000, now() ).unwrap();
    let outcome = ledger.commit( &r.id, 300_000 ).unwrap();
    assert_eq!( outcome.applied_micros, 300_000 );
    assert!( !outcome.overrun );
    assert_eq!( ledger.committed_micros( &user, now() ), 300_000 );

    let r2 = ledger.reserve( &user, 700_000, now() ).unwrap();
    ledger.commit( &r2.id, 700_000 ).unwrap();
    assert_eq!( ledger.committed_micros( &user, now() ), 1_000_000 );
  }

  #[ test ]
  fn commit_beyond_slack_clamps_and_flags_overrun()
  {
    let ledger = BudgetLedger::new( 1_000_000, 300, 10_000 );
    let user = UserId::generate();
    let r = ledger.reserve( &user, 500_000, now() ).unwrap();
    let outcome = ledger.commit( &r.id, 600_000 ).unwrap();
    assert!( outcome.overrun );
    assert_eq!( outcome.applied_micros, 510_000 );
  }

  #[ test ]
  fn refund_releases_full_reservation()
  {
    let ledger = BudgetLedger::new( 1_000_000, 300, 0 );
    let user = UserId::generate();
    let r = ledger.reserve( &user, 500_000, now() ).unwrap();
    ledger.refund( &r.id ).unwrap();
    assert_eq!( ledger.committed_micros( &user, now() ), 0 );
    let r2 = ledger.reserve( &user, 1_000_000, now() ).unwrap();
    ledger.commit( &r2.id, 1_000_000 ).unwrap();
  }

  #[ test ]
  fn commit_on_unknown_reservation_errs()
  {
    let ledger = BudgetLedger::new( 1_000_000, 300, 0 );
    let err = ledger.commit( &ReservationId::generate(), 100 ).unwrap_err();
    assert!( matches!( err, LedgerError::UnknownReservation( .. ) ) );
  }

  #[ test ]
  fn expired_reservation_is_auto_refunded_on_next_access()
  {
    let ledger = BudgetLedger::new( 1_000_000, 1, 0 );
    let user = UserId::generate();
    ledger.reserve( &user, 900_000, now() ).unwrap();

    let later = now() + Duration::seconds( 5 );
    // Without the sweep this would fail: 900_000 reserved + 200_000 > limit.
    let r2 = ledger.reserve( &user, 200_000, later ).unwrap();
    assert_eq!( r2.amount_micros, 200_000 );
  }
}
