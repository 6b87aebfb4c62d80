//! Frame driver and recursive sequence parsing
//!
//! [`PushParser::decode`] locates the notification marker, positions
//! the cursor on the top-level container and walks it: at every
//! sequence position the registered patterns are tried in priority
//! order before falling back to a generic skip-and-recurse, so
//! descriptors are found at any nesting depth regardless of how the
//! vendor arranged the frame.

use crate::buffer::PushBuffer;
use crate::object::{DecodedObject, ObjectSink};
use crate::pattern::matcher::{self, Captures};
use crate::pattern::registry::PatternRegistry;
use crate::pattern::Pattern;
use log::{debug, trace, warn};
use push_core::datatypes::{looks_like_date_time, DATE_TIME_LENGTH};
use push_core::{DataTag, ObisCode, PushResult, TagSize};

/// Tag byte of a data-notification APDU
const NOTIFICATION_TAG: u8 = 0x0F;

/// Invoke-id-and-priority field following the notification tag
const PREAMBLE_LENGTH: usize = 5;

/// Bound on structure/array nesting against malformed frames
const MAX_NESTING_DEPTH: usize = 32;

/// Priority the built-in pattern set registers at; a custom pattern
/// registered below this wins every position it can match
pub const DEFAULT_PATTERN_PRIORITY: i32 = 10;

/// Stream parser for push-notification frames
///
/// One transmission may hold several back-to-back frames, so the
/// driving caller either invokes [`PushParser::decode`] repeatedly
/// until the cursor stalls or reaches the end, or uses
/// [`PushParser::decode_all`] which runs that loop itself.
pub struct PushParser<S> {
    registry: PatternRegistry,
    sink: S,
    objects_found: usize,
}

impl<S: ObjectSink> PushParser<S> {
    pub fn new(sink: S) -> Self {
        Self {
            registry: PatternRegistry::new(),
            sink,
            objects_found: 0,
        }
    }

    /// Install the built-in pattern set
    ///
    /// Covers the frame layouts observed from meters so far: fully
    /// tagged descriptors, value-with-scaler-structure layouts, and
    /// the untagged first-element form.
    pub fn register_default_patterns(&mut self) -> PushResult<()> {
        self.register_pattern("T1", "TC,TO,TS,TV", DEFAULT_PATTERN_PRIORITY)?;
        self.register_pattern("T2", "TO,TV,TSU", DEFAULT_PATTERN_PRIORITY)?;
        self.register_pattern("T3", "TV,TC,TSU,TO", DEFAULT_PATTERN_PRIORITY)?;
        self.register_pattern("U.ZPA", "F,C,O,A,TV", DEFAULT_PATTERN_PRIORITY)?;
        Ok(())
    }

    /// Compile a DSL string and register the resulting pattern
    pub fn register_pattern(&mut self, name: &str, dsl: &str, priority: i32) -> PushResult<()> {
        let pattern = Pattern::from_dsl(name, dsl, priority)?;
        self.registry.add(pattern);
        Ok(())
    }

    /// Register an already compiled pattern
    pub fn register(&mut self, pattern: Pattern) {
        self.registry.add(pattern);
    }

    /// Drop all registered patterns, for a full reconfiguration
    pub fn clear_patterns(&mut self) {
        self.registry.clear();
    }

    pub fn patterns(&self) -> &[Pattern] {
        self.registry.patterns()
    }

    /// Objects emitted over the parser's lifetime
    pub fn objects_found(&self) -> usize {
        self.objects_found
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Decode one frame from the cursor onward
    ///
    /// Returns the number of objects emitted during this call. Objects
    /// emitted before a failure point are kept; a return of zero with
    /// no cursor progress means the buffer holds nothing more to parse.
    pub fn decode(&mut self, buf: &mut PushBuffer) -> usize {
        let found_before = self.objects_found;

        if buf.is_empty() {
            trace!("Buffer is empty");
            return 0;
        }
        debug!(
            "Starting AXDR parsing of {} bytes at position {}",
            buf.len(),
            buf.position()
        );

        // Skip transport residue up to the notification tag
        while !buf.at_end() {
            if buf.read_byte() == NOTIFICATION_TAG {
                debug!("Found notification tag at position {}", buf.position() - 1);
                break;
            }
        }

        // Invoke id and priority carry nothing we need
        for _ in 0..PREAMBLE_LENGTH {
            buf.read_byte();
        }

        // Some meters put the frame timestamp before the data
        if looks_like_date_time(&buf.bytes()[buf.position()..]) {
            debug!("Skipping datetime at position {}", buf.position());
            buf.skip(DATE_TIME_LENGTH);
        }

        let start_tag = buf.read_byte();
        if start_tag != DataTag::Structure.to_u8() && start_tag != DataTag::Array.to_u8() {
            trace!(
                "Expected structure or array after notification tag, found 0x{:02X} at position {}",
                start_tag,
                buf.position()
            );
            return self.objects_found - found_before;
        }

        if !self.parse_element(buf, start_tag, 0) {
            trace!("Frame only partially parsed, keeping objects found so far");
        }
        debug!(
            "Parsing pass complete, cursor at {}/{}",
            buf.position(),
            buf.len()
        );

        self.objects_found - found_before
    }

    /// Rewind and decode frames until the cursor stalls or reaches the
    /// end, returning the total object count
    pub fn decode_all(&mut self, buf: &mut PushBuffer) -> usize {
        buf.rewind();
        let mut total = 0;

        while !buf.at_end() {
            let before = buf.position();
            let found = self.decode(buf);
            if found == 0 && buf.position() == before {
                warn!(
                    "No progress at position {}/{}, stopping",
                    buf.position(),
                    buf.len()
                );
                break;
            }
            total += found;
        }
        total
    }

    fn parse_element(&mut self, buf: &mut PushBuffer, tag: u8, depth: usize) -> bool {
        if tag == DataTag::Structure.to_u8() || tag == DataTag::Array.to_u8() {
            self.parse_sequence(buf, tag, depth)
        } else {
            skip_data(buf, tag)
        }
    }

    fn parse_sequence(&mut self, buf: &mut PushBuffer, tag: u8, depth: usize) -> bool {
        if depth > MAX_NESTING_DEPTH {
            warn!(
                "Nesting deeper than {} at position {}, aborting",
                MAX_NESTING_DEPTH,
                buf.position()
            );
            return false;
        }

        let count = buf.read_byte();
        if count == 0xFF {
            trace!(
                "Invalid sequence length at position {}",
                buf.position().saturating_sub(1)
            );
            return false;
        }
        trace!(
            "Parsing {} with {} elements at position {}",
            container_name(tag),
            count,
            buf.position()
        );

        let mut consumed = 0usize;
        while consumed < count as usize {
            let start = buf.position();

            if let Some(used) = self.try_patterns(buf, consumed) {
                consumed += used;
                continue;
            }

            if buf.at_end() {
                trace!(
                    "Unexpected end while reading element {} of {}",
                    consumed + 1,
                    container_name(tag)
                );
                return false;
            }
            let elem_tag = buf.read_byte();
            if !self.parse_element(buf, elem_tag, depth + 1) {
                return false;
            }
            consumed += 1;

            if buf.position() == start {
                trace!(
                    "No progress parsing element {} at position {}, aborting",
                    consumed,
                    start
                );
                return false;
            }
        }

        true
    }

    /// Try every registered pattern at the current position
    ///
    /// Returns the matched pattern's element count, with the cursor
    /// already advanced past the match; `None` leaves the cursor where
    /// it was.
    fn try_patterns(&mut self, buf: &mut PushBuffer, elem_idx: usize) -> Option<usize> {
        let Self {
            registry,
            sink,
            objects_found,
        } = self;

        for pattern in registry.patterns() {
            let matched = buf.try_parse(|b| matcher::attempt(b, elem_idx, pattern));
            if let Some(m) = matched {
                debug!(
                    "Matched pattern '{}' at element {}, {} elements consumed",
                    pattern.name, elem_idx, m.elements_consumed
                );
                emit(sink, objects_found, pattern, &m.captures, buf);
                return Some(m.elements_consumed);
            }
        }
        None
    }
}

/// Hand a successful match's captures to the sink
///
/// A match without an OBIS capture identifies nothing and is dropped.
fn emit<S: ObjectSink>(
    sink: &mut S,
    objects_found: &mut usize,
    pattern: &Pattern,
    captures: &Captures,
    buf: &PushBuffer,
) {
    let Some(obis_span) = captures.obis else {
        trace!("Pattern '{}' matched without an OBIS capture, dropped", pattern.name);
        return;
    };

    let data = buf.bytes();
    let Ok(obis) = ObisCode::try_from(obis_span.bytes(data)) else {
        return;
    };

    let object = DecodedObject {
        class_id: captures.class_id.unwrap_or(pattern.default_class_id),
        obis,
        value_type: captures.value_type,
        value: captures.value.bytes(data),
        scaler: captures.scaler,
        unit: captures.unit,
    };
    sink.on_object(&object);
    *objects_found += 1;
}

/// Skip one non-container element's payload
fn skip_data(buf: &mut PushBuffer, tag: u8) -> bool {
    let Ok(tag) = DataTag::from_u8(tag) else {
        return false;
    };

    match tag.size() {
        TagSize::Empty => true,
        TagSize::Fixed(len) => buf.skip(len),
        TagSize::Variable => {
            let len = buf.read_byte();
            if len == 0xFF {
                return false;
            }
            buf.skip(len as usize)
        }
    }
}

fn container_name(tag: u8) -> &'static str {
    if tag == DataTag::Structure.to_u8() {
        "STRUCTURE"
    } else {
        "ARRAY"
    }
}
