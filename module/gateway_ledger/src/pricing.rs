//! Per-model pricing used to turn token usage into a cost estimate.
//!
//! Prices are a small embedded table rather than a loaded asset: the
//! governance gateway only ever needs a conservative estimate to drive the
//! reservation gate (§4.2) — the committed amount always comes from the
//! provider's own reported usage, never from this table.

/// Microdollar price per 1,000 tokens, split prompt/completion.
#[ derive( Debug, Clone, Copy ) ]
pub struct ModelPrice
{
  /// Microdollars per 1,000 prompt tokens.
  pub prompt_micros_per_1k: u64,
  /// Microdollars per 1,000 completion tokens.
  pub completion_micros_per_1k: u64,
}

const TABLE: &[ ( &str, ModelPrice ) ] =
&[
  ( "gpt-4o", ModelPrice { prompt_micros_per_1k: 5_000, completion_micros_per_1k: 15_000 } ),
  ( "gpt-4o-mini", ModelPrice { prompt_micros_per_1k: 150, completion_micros_per_1k: 600 } ),
  ( "claude-3-5-sonnet", ModelPrice { prompt_micros_per_1k: 3_000, completion_micros_per_1k: 15_000 } ),
  ( "claude-3-5-haiku", ModelPrice { prompt_micros_per_1k: 800, completion_micros_per_1k: 4_000 } ),
];

/// Conservative price applied to a model absent from [`TABLE`], so an unknown
/// model never slips through the reservation gate unpriced.
const FALLBACK: ModelPrice = ModelPrice { prompt_micros_per_1k: 10_000, completion_micros_per_1k: 30_000 };

/// Look up the price for `model`, falling back to a conservative default.
#[must_use]
pub fn price_for( model: &str ) -> ModelPrice
{
  TABLE.iter().find( | ( name, _ ) | *name == model ).map_or( FALLBACK, | ( _, price ) | *price )
}

/// Estimate cost in microdollars from token counts.
#[must_use]
pub fn estimate_cost_micros( model: &str, prompt_tokens: u64, completion_tokens: u64 ) -> u64
{
  let price = price_for( model );
  let prompt_cost = prompt_tokens.saturating_mul( price.prompt_micros_per_1k ) / 1_000;
  let completion_cost = completion_tokens.saturating_mul( price.completion_micros_per_1k ) / 1_000;
  prompt_cost.saturating_add( completion_cost )
}

#[ cfg( test ) ]
mod tests
{
  use super::*;

  #[ test ]
  fn known_model_uses_table_price()
  {
    let cost = estimate_cost_micros( "gpt-4o-mini", 1_000, 1_000 );
    assert_eq!( cost, 150 + 600 );
  }

  #[ test ]
  fn unknown_model_uses_conservative_fallback()
  {
    let cost = estimate_cost_micros( "some-new-model", 1_000, 0 );
    assert_eq!( cost, FALLBACK.prompt_micros_per_1k );
  }
}
