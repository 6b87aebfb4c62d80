//! Decoder for unsolicited DLMS/COSEM push notification frames
//!
//! # Architecture
//!
//! This library is organized as a workspace with two crates:
//!
//! - `push-core`: error type, OBIS codes, A-XDR tag vocabulary, value
//!   codec and datetime heuristic
//! - `push-axdr`: input buffer with cursor, descriptor pattern DSL,
//!   registry and matcher, and the recursive stream parser
//!
//! # Usage
//!
//! ```no_run
//! use push::{DecodedObject, PushBuffer, PushParser};
//!
//! let mut parser = PushParser::new(|object: &DecodedObject<'_>| {
//!     println!("{} = {}", object.obis, object.scaled_value());
//! });
//! parser.register_default_patterns().unwrap();
//!
//! let mut buffer = PushBuffer::new();
//! // ... transport layer appends received bytes ...
//! let objects = parser.decode_all(&mut buffer);
//! println!("decoded {} objects", objects);
//! ```
//!
//! A transmission may contain several concatenated frames;
//! `decode_all` keeps decoding until the cursor stalls or reaches the
//! end of the buffer. Decoded objects borrow from the buffer and must
//! be copied out (`DecodedObject::to_owned`) if they are kept past the
//! decode call.

pub use push_axdr::{
    Checkpoint, DecodedObject, ObjectSink, OwnedObject, Pattern, PatternRegistry, PushBuffer,
    PushParser, Span, Step, ValueRule,
};
pub use push_core::{
    datatypes::{as_float, as_string, format_date_time, looks_like_date_time},
    DataTag, ObisCode, PushError, PushResult, TagSize,
};

pub use push_axdr;
pub use push_core;
