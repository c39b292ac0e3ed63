//! PII span detection over a single string.

use regex::Regex;

/// A detected PII span within a string, as a half-open byte range `[start, end)`.
#[ derive( Debug, Clone, Copy, PartialEq, Eq ) ]
pub struct Span
{
  /// Byte offset of the first matched byte.
  pub start: usize,
  /// Byte offset one past the last matched byte.
  pub end: usize,
  /// Kind of entity matched.
  pub entity_type: EntityType,
}

impl Span
{
  fn len( &self ) -> usize
  {
    self.end - self.start
  }

  fn overlaps( &self, other: &Span ) -> bool
  {
    self.start < other.end && other.start < self.end
  }
}

/// Kind of PII entity a [`Span`] was matched as.
#[ derive( Debug, Clone, Copy, PartialEq, Eq ) ]
pub enum EntityType
{
  /// A personal name (two or more consecutive capitalized words).
  Person,
  /// An email address.
  Email,
  /// A phone number.
  PhoneNumber,
  /// A US social security number (`ddd-dd-dddd`).
  Ssn,
}

impl EntityType
{
  /// Uppercase token spliced into `<REDACTED {TOKEN}>`.
  #[must_use]
  pub fn label( self ) -> &'static str
  {
    match self
    {
      Self::Person => "PERSON",
      Self::Email => "EMAIL",
      Self::PhoneNumber => "PHONE_NUMBER",
      Self::Ssn => "SSN",
    }
  }
}

/// Sentence-initial words that precede a name often enough to be absorbed by
/// the [`Detector::person`] pattern's leading capitalized word. Stripped from
/// the front of a candidate span rather than excluded from the pattern
/// itself, so `"Call John Doe"` still yields a `PERSON` span over `"John Doe"`.
const LEADING_STOP_WORDS: &[ &str ] = &[ "Call", "Contact", "Email", "Text", "Dear", "Hi", "Hello", "Please", "Tell", "Ask", "Reach", "Notify", "The", "This", "That" ];

/// Regex-backed detector for the entity types [`EntityType`] names.
#[ derive( Debug ) ]
pub struct Detector
{
  email: Regex,
  phone: Regex,
  person: Regex,
  ssn: Regex,
}

impl Default for Detector
{
  fn default() -> Self
  {
    Self::new()
  }
}

impl Detector
{
  /// Build a detector with the default patterns. The patterns are fixed
  /// literals, so construction cannot fail.
  #[must_use]
  pub fn new() -> Self
  {
    Self
    {
      email: Regex::new( r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}" ).expect( "static pattern" ),
      phone: Regex::new( r"\b\d{3}-\d{3}-\d{4}\b|\b\d{3}-\d{4}\b|\(\d{3}\)\s?\d{3}-\d{4}" ).expect( "static pattern" ),
      person: Regex::new( r"\b[A-Z][a-z]+(?:\s[A-Z][a-z]+)+\b" ).expect( "static pattern" ),
      ssn: Regex::new( r"\b\d{3}-\d{2}-\d{4}\b" ).expect( "static pattern" ),
    }
  }

  /// Return every detected span in `text`, overlap-resolved: the longest span
  /// wins, ties broken by earliest start.
  #[must_use]
  pub fn detect( &self, text: &str ) -> Vec< Span >
  {
    let mut candidates: Vec< Span > = Vec::new();
    candidates.extend( self.email.find_iter( text ).map( | m | Span { start: m.start(), end: m.end(), entity_type: EntityType::Email } ) );
    candidates.extend( self.phone.find_iter( text ).map( | m | Span { start: m.start(), end: m.end(), entity_type: EntityType::PhoneNumber } ) );
    candidates.extend( self.ssn.find_iter( text ).map( | m | Span { start: m.start(), end: m.end(), entity_type: EntityType::Ssn } ) );
    candidates.extend( self.person.find_iter( text ).filter_map( | m | strip_leading_stop_word( text, m.start(), m.end() ) ) );

    resolve_overlaps( candidates )
  }
}

/// Drop a [`LEADING_STOP_WORDS`] member from the front of a `person` match,
/// discarding the candidate entirely if fewer than two capitalized words
/// remain once it's stripped.
fn strip_leading_stop_word( text: &str, start: usize, end: usize ) -> Option< Span >
{
  let matched = &text[ start..end ];
  let Some( first_word_len ) = matched.split_whitespace().next().map( str::len ) else { return None };
  let first_word = &matched[ ..first_word_len ];

  if !LEADING_STOP_WORDS.contains( &first_word )
  {
    return Some( Span { start, end, entity_type: EntityType::Person } );
  }

  let rest = &matched[ first_word_len.. ];
  let trimmed = rest.trim_start();
  if trimmed.split_whitespace().count() < 2
  {
    return None;
  }

  let new_start = start + ( rest.len() - trimmed.len() ) + first_word_len;
  Some( Span { start: new_start, end, entity_type: EntityType::Person } )
}

/// Keep the longest span at each point of overlap; ties broken by earliest start.
fn resolve_overlaps( mut candidates: Vec< Span > ) -> Vec< Span >
{
  candidates.sort_by( | a, b | b.len().cmp( &a.len() ).then( a.start.cmp( &b.start ) ) );

  let mut accepted: Vec< Span > = Vec::new();
  for candidate in candidates
  {
    if !accepted.iter().any( | a | a.overlaps( &candidate ) )
    {
      accepted.push( candidate );
    }
  }
  accepted
}

#[ cfg( test ) ]
mod tests
{
  use super::*;

  #[ test ]
  fn detects_email_and_phone()
  {
    let detector = Detector::new();
    let spans = detector.detect( "Call John Doe at 555-0199 or a@b.com" );
    let labels: Vec< &str > = spans.iter().map( | s | s.entity_type.label() ).collect();
    assert!( labels.contains( &"PERSON" ) );
    assert!( labels.contains( &"PHONE_NUMBER" ) );
    assert!( labels.contains( &"EMAIL" ) );
  }

  #[ test ]
  fn overlapping_spans_keep_the_longest()
  {
    let spans = resolve_overlaps( vec!
    [
      Span { start: 0, end: 5, entity_type: EntityType::Person },
      Span { start: 0, end: 10, entity_type: EntityType::Person },
    ] );
    assert_eq!( spans.len(), 1 );
    assert_eq!( spans[ 0 ].end, 10 );
  }

  #[ test ]
  fn ties_break_on_earliest_start()
  {
    let spans = resolve_overlaps( vec!
    [
      Span { start: 5, end: 10, entity_type: EntityType::Person },
      Span { start: 0, end: 5, entity_type: EntityType::Email },
    ] );
    // Equal length (5), non-overlapping, both kept, ordered by sort not matter here.
    assert_eq!( spans.len(), 2 );
  }

  #[ test ]
  fn sentence_initial_word_is_not_absorbed_into_the_name()
  {
    let detector = Detector::new();
    let text = "Call John Doe at 555-0199.";
    let spans = detector.detect( text );
    let person = spans.iter().find( | s | s.entity_type.label() == "PERSON" ).expect( "person span" );
    assert_eq!( &text[ person.start..person.end ], "John Doe" );
  }

  #[ test ]
  fn detects_ssn()
  {
    let detector = Detector::new();
    let spans = detector.detect( "SSN 123-45-6789" );
    assert!( spans.iter().any( | s | s.entity_type.label() == "SSN" ) );
  }
}
