//! Microdollar conversion helpers.
//!
//! 1 USD = 1,000,000 microdollars. All ledger arithmetic happens in integer
//! microdollars; floating point only appears at the edges where a USD value
//! is surfaced for display.

/// Microdollars per USD.
pub const MICROS_PER_USD: u64 = 1_000_000;

/// Convert USD (f64) to microdollars (u64), rounding to the nearest micro.
///
/// ```
/// use gateway_ledger::converter::usd_to_micros;
/// assert_eq!(usd_to_micros(1.50), 1_500_000);
/// assert_eq!(usd_to_micros(0.000001), 1);
/// ```
#[must_use]
pub fn usd_to_micros(usd: f64) -> u64
{
  ( usd * MICROS_PER_USD as f64 ).round().max( 0.0 ) as u64
}

/// Convert microdollars (u64) to USD (f64).
///
/// ```
/// use gateway_ledger::converter::micros_to_usd;
/// assert_eq!(micros_to_usd(1_500_000), 1.5);
/// assert_eq!(micros_to_usd(1), 0.000001);
/// ```
#[must_use]
pub fn micros_to_usd( micros: u64 ) -> f64
{
  micros as f64 / MICROS_PER_USD as f64
}

#[ cfg( test ) ]
mod tests
{
  use super::*;

  #[ test ]
  fn roundtrips_on_whole_cents()
  {
    assert_eq!( usd_to_micros( micros_to_usd( 2_500_000 ) ), 2_500_000 );
  }

  #[ test ]
  fn zero_is_zero()
  {
    assert_eq!( usd_to_micros( 0.0 ), 0 );
    assert_eq!( micros_to_usd( 0 ), 0.0 );
  }
}
