//! Depth-first, shape-preserving redaction over a JSON-shaped tree.

use crate::detector::Detector;
use serde_json::Value;

/// Scrub every string reachable from `value`, rebuilding the tree bottom-up.
///
/// Non-string leaves (`null`, `bool`, `number`) pass through unchanged.
/// Sequences and mappings are rebuilt from their already-scrubbed children,
/// never mutated in place, so a string nested at any depth is reached.
#[must_use]
pub fn scrub( value: &Value, detector: &Detector ) -> Value
{
  match value
  {
    Value::String( s ) => Value::String( redact_string( s, detector ) ),
    Value::Array( items ) => Value::Array( items.iter().map( | v | scrub( v, detector ) ).collect() ),
    Value::Object( map ) => Value::Object( map.iter().map( | ( k, v ) | ( k.clone(), scrub( v, detector ) ) ).collect() ),
    other => other.clone(),
  }
}

/// Replace every detected span in `text` with `<REDACTED {ENTITY_TYPE}>`.
///
/// Spans are processed in descending start order so that splicing one span
/// never invalidates the byte offsets of an earlier one still to be applied.
fn redact_string( text: &str, detector: &Detector ) -> String
{
  let mut spans = detector.detect( text );
  spans.sort_by( | a, b | b.start.cmp( &a.start ) );

  let mut out = text.to_string();
  for span in spans
  {
    out.replace_range( span.start..span.end, &format!( "<REDACTED {}>", span.entity_type.label() ) );
  }
  out
}

#[ cfg( test ) ]
mod tests
{
  use super::*;
  use serde_json::json;

  #[ test ]
  fn scrubs_top_level_string()
  {
    let detector = Detector::new();
    let out = scrub( &json!( "Call John Doe at 555-0199." ), &detector );
    assert_eq!( out, json!( "Call <REDACTED PERSON> at <REDACTED PHONE_NUMBER>." ) );
  }

  #[ test ]
  fn reaches_nested_strings_at_arbitrary_depth()
  {
    let detector = Detector::new();
    let input = json!( {
      "messages": [
        { "role": "user", "content": "Email a@b.com please" },
        { "role": "assistant", "content": [ "nested", "reach a@b.com too" ] }
      ]
    } );
    let out = scrub( &input, &detector );
    assert_eq!( out[ "messages" ][ 0 ][ "content" ], json!( "Email <REDACTED EMAIL> please" ) );
    assert_eq!( out[ "messages" ][ 1 ][ "content" ][ 1 ], json!( "reach <REDACTED EMAIL> too" ) );
  }

  #[ test ]
  fn non_string_leaves_pass_through()
  {
    let detector = Detector::new();
    let input = json!( { "count": 3, "ok": true, "note": null } );
    assert_eq!( scrub( &input, &detector ), input );
  }

  #[ test ]
  fn rescrubbing_output_is_idempotent()
  {
    let detector = Detector::new();
    let once = scrub( &json!( "Contact John Doe at 555-0199." ), &detector );
    let twice = scrub( &once, &detector );
    assert_eq!( once, twice );
  }
}
