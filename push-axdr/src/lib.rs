//! A-XDR stream decoder for DLMS/COSEM push notifications
//!
//! Utility meters in push mode emit unsolicited data-notification
//! frames whose layout varies between vendors: attribute descriptors
//! may be tagged or untagged, reordered, or wrapped in extra
//! structures. Instead of a fixed schema, this crate walks the nested
//! STRUCTURE/ARRAY containers with a recursive-descent parser and, at
//! every sequence position, speculatively tries a priority-ordered set
//! of descriptor patterns compiled from a small textual DSL, rolling
//! the cursor back after each failed attempt.
//!
//! Decoded objects are handed to an [`object::ObjectSink`] as views
//! into the shared input buffer; consumers must copy out anything they
//! keep past the decode call.

pub mod buffer;
pub mod object;
pub mod parser;
pub mod pattern;

pub use buffer::{Checkpoint, PushBuffer, Span};
pub use object::{DecodedObject, ObjectSink, OwnedObject};
pub use parser::PushParser;
pub use pattern::registry::PatternRegistry;
pub use pattern::{Pattern, Step, ValueRule};
