//! Streaming reader for a restricted YAML subset.
//!
//! Characters flow through a normalizing pushback [`tokenizer::Reader`], the
//! [`tokenizer::Lexer`] turns them into indentation-tagged tokens, and the
//! [`EventIterator`] turns those into JSON-shaped events:
//!
//! ```
//! use tin_yaml::{Event, EventIterator};
//!
//! let mut events = EventIterator::from("a: 1");
//! assert_eq!(events.next_event().unwrap(), Event::StartObject);
//! assert_eq!(events.next_event().unwrap(), Event::PropertyName("a".into()));
//! assert_eq!(events.next_event().unwrap(), Event::String("1".into()));
//! assert_eq!(events.next_event().unwrap(), Event::EndObject);
//! assert_eq!(events.next_event().unwrap(), Event::End);
//! ```
//!
//! All scalars are strings. Anchors, aliases and flow collections are out of
//! scope; tags are lexed but ignored.

pub use error::{Diagnostic, ErrorType, YamlError, YamlResult};
pub use options::Options;
pub use parser::{assert_eq_event, Event, EventIterator};

pub mod error;
pub mod options;
pub mod parser;
pub mod tokenizer;
