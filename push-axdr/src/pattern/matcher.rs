//! Speculative execution of one pattern against the buffer
//!
//! The matcher never restores the cursor itself: a failed attempt
//! leaves the cursor wherever the failing step stopped, and the caller
//! rolls back to its checkpoint. This keeps the matcher allocation-free
//! and reusable for nested speculative calls.

use crate::buffer::{PushBuffer, Span};
use crate::pattern::{Pattern, Step, ValueRule};
use push_core::datatypes::{looks_like_date_time, DATE_TIME_LENGTH};
use push_core::{DataTag, TagSize};

/// Class ids above this are assumed to be misparsed bytes, not real
/// COSEM classes
const MAX_CLASS_ID: u16 = 0x00FF;

/// Per-attempt captures, discarded when the attempt fails
#[derive(Debug, Clone, Copy)]
pub(crate) struct Captures {
    pub class_id: Option<u16>,
    pub obis: Option<Span>,
    pub value_type: DataTag,
    pub value: Span,
    pub scaler: Option<i8>,
    pub unit: Option<u8>,
}

impl Default for Captures {
    fn default() -> Self {
        Self {
            class_id: None,
            obis: None,
            value_type: DataTag::None,
            value: Span::default(),
            scaler: None,
            unit: None,
        }
    }
}

/// Outcome of a successful attempt
#[derive(Debug)]
pub(crate) struct Match {
    /// How many elements of the enclosing sequence the pattern covered
    pub elements_consumed: usize,
    pub captures: Captures,
}

/// Execute one pattern's steps from the current cursor position
///
/// `elem_idx` is the index of the current element within the enclosing
/// sequence, for `Step::First`. On success, a pattern that consumed no
/// top-level element reports 1 so the sequence loop always moves
/// forward.
pub(crate) fn attempt(buf: &mut PushBuffer, elem_idx: usize, pattern: &Pattern) -> Option<Match> {
    let mut captures = Captures::default();
    let mut consumed = 0usize;

    run_steps(buf, &pattern.steps, elem_idx, 0, &mut consumed, &mut captures)?;

    if consumed == 0 {
        consumed = 1;
    }
    Some(Match {
        elements_consumed: consumed,
        captures,
    })
}

fn run_steps(
    buf: &mut PushBuffer,
    steps: &[Step],
    elem_idx: usize,
    depth: usize,
    consumed: &mut usize,
    captures: &mut Captures,
) -> Option<()> {
    for step in steps {
        run_step(buf, step, elem_idx, depth, consumed, captures)?;
    }
    Some(())
}

/// Count a completed element, but only at the top nesting level
fn consume_one(depth: usize, consumed: &mut usize) {
    if depth == 0 {
        *consumed += 1;
    }
}

fn run_step(
    buf: &mut PushBuffer,
    step: &Step,
    elem_idx: usize,
    depth: usize,
    consumed: &mut usize,
    captures: &mut Captures,
) -> Option<()> {
    match step {
        Step::First => {
            if elem_idx != 0 {
                return None;
            }
        }
        Step::ExactTag { tag, put_back } => {
            let checkpoint = buf.checkpoint();
            if buf.read_byte() != tag.to_u8() {
                return None;
            }
            if *put_back {
                buf.rollback(checkpoint);
            } else {
                consume_one(depth, consumed);
            }
        }
        Step::AnyInt8Tag => {
            let tag = buf.read_byte();
            if tag != DataTag::Int8.to_u8() && tag != DataTag::Uint8.to_u8() {
                return None;
            }
            consume_one(depth, consumed);
        }
        Step::ClassId => {
            let class_id = buf.read_u16();
            if class_id > MAX_CLASS_ID {
                return None;
            }
            captures.class_id = Some(class_id);
        }
        Step::ObisTagged => {
            if buf.read_byte() != DataTag::OctetString.to_u8() {
                return None;
            }
            if buf.read_byte() != 6 {
                return None;
            }
            captures.obis = Some(buf.take(6)?);
            consume_one(depth, consumed);
        }
        Step::ObisUntagged => {
            captures.obis = Some(buf.take(6)?);
        }
        Step::AttributeId => {
            let attribute_id = buf.read_byte();
            if attribute_id == 0 {
                return None;
            }
        }
        Step::Value(rule) => {
            capture_value(buf, rule, captures)?;
            consume_one(depth, consumed);
        }
        Step::Scaler => {
            if buf.read_byte() != DataTag::Int8.to_u8() {
                return None;
            }
            captures.scaler = Some(buf.read_byte() as i8);
            consume_one(depth, consumed);
        }
        Step::Unit => {
            if buf.read_byte() != DataTag::Enum.to_u8() {
                return None;
            }
            captures.unit = Some(buf.read_byte());
            consume_one(depth, consumed);
        }
        Step::Structure { count, children } => {
            if buf.read_byte() != DataTag::Structure.to_u8() {
                return None;
            }
            if buf.read_byte() != *count {
                return None;
            }
            consume_one(depth, consumed);
            run_steps(buf, children, elem_idx, depth + 1, consumed, captures)?;
        }
    }
    Some(())
}

/// Capture a tagged value of any non-container type
fn capture_value(buf: &mut PushBuffer, rule: &ValueRule, captures: &mut Captures) -> Option<()> {
    let tag = DataTag::from_u8(buf.read_byte()).ok()?;
    if let Some(expected) = rule.expect_tag {
        if tag != expected {
            return None;
        }
    }
    if !tag.is_value_type() {
        return None;
    }

    let span = match tag.size() {
        TagSize::Fixed(len) => buf.take(len)?,
        TagSize::Empty => Span {
            offset: buf.position(),
            len: 0,
        },
        TagSize::Variable => {
            let len = buf.read_byte();
            if len == 0xFF {
                return None;
            }
            if let Some(expected_len) = rule.expect_len {
                if len != expected_len {
                    return None;
                }
            }
            buf.take(len as usize)?
        }
    };

    // A 12-byte octet string holding a plausible clock value is really
    // a datetime the meter did not bother to tag.
    let mut value_type = tag;
    if tag == DataTag::OctetString
        && span.len == DATE_TIME_LENGTH
        && looks_like_date_time(span.bytes(buf.bytes()))
    {
        value_type = DataTag::DateTime;
    }

    captures.value_type = rule.reinterpret.unwrap_or(value_type);
    captures.value = span;
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;

    fn attempt_on(bytes: &[u8], pattern: &Pattern) -> (Option<Match>, usize) {
        let mut buf = PushBuffer::from_slice(bytes);
        let result = attempt(&mut buf, 0, pattern);
        (result, buf.position())
    }

    #[test]
    fn test_tagged_descriptor_match() {
        let pattern = Pattern::from_dsl("T1", "TC,TO,TS,TV", 10).unwrap();
        let bytes = [
            0x12, 0x00, 0x03, // UINT16 tag, class id 3
            0x09, 0x06, 0x01, 0x00, 0x01, 0x08, 0x00, 0xFF, // tagged OBIS
            0x0F, 0xFF, // scaler -1
            0x12, 0x04, 0xD2, // UINT16 value 1234
        ];
        let (result, _) = attempt_on(&bytes, &pattern);
        let m = result.unwrap();
        assert_eq!(m.elements_consumed, 4);
        assert_eq!(m.captures.class_id, Some(3));
        assert_eq!(m.captures.scaler, Some(-1));
        assert_eq!(m.captures.value_type, DataTag::Uint16);
        assert_eq!(m.captures.value, Span { offset: 14, len: 2 });
    }

    #[test]
    fn test_scaler_unit_structure() {
        let pattern = Pattern::from_dsl("su", "TSU", 10).unwrap();
        let bytes = [0x02, 0x02, 0x0F, 0xFD, 0x16, 0x1E];
        let (result, position) = attempt_on(&bytes, &pattern);
        let m = result.unwrap();
        // the whole structure is one element of the enclosing sequence
        assert_eq!(m.elements_consumed, 1);
        assert_eq!(m.captures.scaler, Some(-3));
        assert_eq!(m.captures.unit, Some(0x1E));
        assert_eq!(position, bytes.len());
    }

    #[test]
    fn test_first_element_constraint() {
        let pattern = Pattern::from_dsl("first", "F,O,TV", 10).unwrap();
        let bytes = [
            0x01, 0x00, 0x01, 0x08, 0x00, 0xFF, // raw OBIS
            0x11, 0x2A, // UINT8 value
        ];
        let mut buf = PushBuffer::from_slice(&bytes);
        assert!(attempt(&mut buf, 1, &pattern).is_none());
        buf.rewind();
        assert!(attempt(&mut buf, 0, &pattern).is_some());
    }

    #[test]
    fn test_structure_count_mismatch_fails() {
        let pattern = Pattern::from_dsl("su", "TSU", 10).unwrap();
        let bytes = [0x02, 0x03, 0x0F, 0xFD, 0x16, 0x1E];
        let (result, _) = attempt_on(&bytes, &pattern);
        assert!(result.is_none());
    }

    #[test]
    fn test_class_id_range_guard() {
        let pattern = Pattern::from_dsl("c", "C,O,TV", 10).unwrap();
        let bytes = [
            0x01, 0x00, // class id 256, above the plausible range
            0x01, 0x00, 0x01, 0x08, 0x00, 0xFF, 0x11, 0x2A,
        ];
        let (result, _) = attempt_on(&bytes, &pattern);
        assert!(result.is_none());
    }

    #[test]
    fn test_zero_attribute_id_fails() {
        let pattern = Pattern::from_dsl("u", "O,A,TV", 10).unwrap();
        let bytes = [0x01, 0x00, 0x01, 0x08, 0x00, 0xFF, 0x00, 0x11, 0x2A];
        let (result, _) = attempt_on(&bytes, &pattern);
        assert!(result.is_none());
    }

    #[test]
    fn test_value_rejects_containers() {
        let pattern = Pattern::from_dsl("v", "TV", 10).unwrap();
        let bytes = [0x02, 0x01, 0x11, 0x2A]; // structure where a value must be
        let (result, _) = attempt_on(&bytes, &pattern);
        assert!(result.is_none());
    }

    #[test]
    fn test_octet_string_reclassified_as_datetime() {
        let pattern = Pattern::from_dsl("v", "TV", 10).unwrap();
        let bytes = [
            0x09, 0x0C, // octet-string, length 12
            0x07, 0xE8, 0x01, 0x0F, 0x01, 0x0E, 0x1E, 0x2D, 0xFF, 0x80, 0x00, 0x00,
        ];
        let (result, _) = attempt_on(&bytes, &pattern);
        assert_eq!(result.unwrap().captures.value_type, DataTag::DateTime);
    }

    #[test]
    fn test_datetime_reinterpret_is_unconditional() {
        // TVOSDTM forces DATETIME even when the heuristic says no
        let pattern = Pattern::from_dsl("dtm", "TVOSDTM", 10).unwrap();
        let bytes = [
            0x09, 0x0C, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66,
        ];
        let (result, _) = attempt_on(&bytes, &pattern);
        assert_eq!(result.unwrap().captures.value_type, DataTag::DateTime);

        // and rejects octet strings of any other length
        let pattern = Pattern::from_dsl("dtm", "TVOSDTM", 10).unwrap();
        let bytes = [0x09, 0x04, 0x01, 0x02, 0x03, 0x04];
        let (result, _) = attempt_on(&bytes, &pattern);
        assert!(result.is_none());
    }

    #[test]
    fn test_put_back_leaves_tag_for_next_step() {
        let pattern = Pattern {
            name: "peek".to_string(),
            priority: 0,
            steps: vec![
                Step::ExactTag {
                    tag: DataTag::Uint16,
                    put_back: true,
                },
                Step::Value(ValueRule::default()),
            ],
            default_class_id: 0,
        };
        let bytes = [0x12, 0x00, 0x2A];
        let (result, position) = attempt_on(&bytes, &pattern);
        let m = result.unwrap();
        assert_eq!(m.captures.value_type, DataTag::Uint16);
        assert_eq!(m.captures.value, Span { offset: 1, len: 2 });
        // put-back contributed no element, the value did
        assert_eq!(m.elements_consumed, 1);
        assert_eq!(position, 3);
    }

    #[test]
    fn test_consumed_defaults_to_one() {
        // a pattern made only of non-counting steps still reports progress
        let pattern = Pattern::from_dsl("bare", "O", 10).unwrap();
        let bytes = [0x01, 0x00, 0x01, 0x08, 0x00, 0xFF];
        let (result, _) = attempt_on(&bytes, &pattern);
        assert_eq!(result.unwrap().elements_consumed, 1);
    }

    #[test]
    fn test_truncated_buffer_fails_cleanly() {
        let pattern = Pattern::from_dsl("T1", "TC,TO,TS,TV", 10).unwrap();
        let bytes = [0x12, 0x00, 0x03, 0x09, 0x06, 0x01, 0x00]; // OBIS cut short
        let (result, _) = attempt_on(&bytes, &pattern);
        assert!(result.is_none());
    }
}
