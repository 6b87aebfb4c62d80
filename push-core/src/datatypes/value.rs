//! Numeric and textual interpretation of captured value payloads
//!
//! Both functions are deliberately forgiving: a value that is not
//! numeric, or whose payload is shorter than its tag requires, decodes
//! to `0.0` / an empty string instead of an error. Decoded objects come
//! out of untrusted frames; downstream consumers are expected to apply
//! their own plausibility checks.

use crate::datatypes::date_time::format_date_time;
use crate::datatypes::tag::DataTag;
use std::fmt::Write;

fn be_u16(buf: &[u8]) -> u16 {
    u16::from_be_bytes([buf[0], buf[1]])
}

fn be_u32(buf: &[u8]) -> u32 {
    u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]])
}

fn be_u64(buf: &[u8]) -> u64 {
    u64::from_be_bytes([
        buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
    ])
}

/// Interpret a captured payload as a number
///
/// Big-endian for every integer width, IEEE 754 for the float tags.
/// Returns `0.0` for non-numeric tags and for payloads shorter than the
/// tag's width.
pub fn as_float(tag: DataTag, buf: &[u8]) -> f64 {
    if buf.is_empty() {
        return 0.0;
    }

    match tag {
        DataTag::Boolean | DataTag::Enum | DataTag::Uint8 => buf[0] as f64,
        DataTag::Int8 => (buf[0] as i8) as f64,
        DataTag::Uint16 if buf.len() >= 2 => be_u16(buf) as f64,
        DataTag::Int16 if buf.len() >= 2 => (be_u16(buf) as i16) as f64,
        DataTag::Uint32 if buf.len() >= 4 => be_u32(buf) as f64,
        DataTag::Int32 if buf.len() >= 4 => (be_u32(buf) as i32) as f64,
        DataTag::Uint64 if buf.len() >= 8 => be_u64(buf) as f64,
        DataTag::Int64 if buf.len() >= 8 => (be_u64(buf) as i64) as f64,
        DataTag::Float32 if buf.len() >= 4 => f32::from_bits(be_u32(buf)) as f64,
        DataTag::Float64 if buf.len() >= 8 => f64::from_bits(be_u64(buf)),
        _ => 0.0,
    }
}

fn hex_of(buf: &[u8]) -> String {
    let mut out = String::with_capacity(buf.len() * 2);
    for byte in buf {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

/// Interpret a captured payload as text
///
/// String tags pass through verbatim (lossily where not valid UTF-8),
/// numeric tags render in decimal, floats with default formatting,
/// bit-string/BCD/date/time as a compact hex dump, and datetime through
/// the placeholder-aware renderer. Anything else gives an empty string.
pub fn as_string(tag: DataTag, buf: &[u8]) -> String {
    match tag {
        DataTag::OctetString | DataTag::VisibleString | DataTag::Utf8String => {
            String::from_utf8_lossy(buf).into_owned()
        }
        DataTag::BitString | DataTag::Bcd | DataTag::Date | DataTag::Time => hex_of(buf),
        DataTag::Boolean | DataTag::Enum | DataTag::Uint8 => {
            if buf.is_empty() {
                String::new()
            } else {
                buf[0].to_string()
            }
        }
        DataTag::Int8 => {
            if buf.is_empty() {
                String::new()
            } else {
                (buf[0] as i8).to_string()
            }
        }
        DataTag::Uint16 if buf.len() >= 2 => be_u16(buf).to_string(),
        DataTag::Int16 if buf.len() >= 2 => (be_u16(buf) as i16).to_string(),
        DataTag::Uint32 if buf.len() >= 4 => be_u32(buf).to_string(),
        DataTag::Int32 if buf.len() >= 4 => (be_u32(buf) as i32).to_string(),
        DataTag::Uint64 if buf.len() >= 8 => be_u64(buf).to_string(),
        DataTag::Int64 if buf.len() >= 8 => (be_u64(buf) as i64).to_string(),
        DataTag::Float32 | DataTag::Float64 => {
            let value = as_float(tag, buf);
            value.to_string()
        }
        DataTag::DateTime => format_date_time(buf),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_float_integers() {
        assert_eq!(as_float(DataTag::Uint8, &[0x2A]), 42.0);
        assert_eq!(as_float(DataTag::Int8, &[0xFF]), -1.0);
        assert_eq!(as_float(DataTag::Uint16, &[0x04, 0xD2]), 1234.0);
        assert_eq!(as_float(DataTag::Int16, &[0xFF, 0xFE]), -2.0);
        assert_eq!(as_float(DataTag::Uint32, &[0x00, 0x01, 0x00, 0x00]), 65536.0);
        assert_eq!(
            as_float(DataTag::Int64, &[0xFF; 8]),
            -1.0
        );
    }

    #[test]
    fn test_as_float_float32_bit_exact() {
        for value in [0.0f32, -1.5, 3.14159, f32::MAX, f32::MIN_POSITIVE] {
            let bytes = value.to_be_bytes();
            let decoded = as_float(DataTag::Float32, &bytes) as f32;
            assert_eq!(decoded.to_bits(), value.to_bits());
        }
    }

    #[test]
    fn test_as_float_float64_bit_exact() {
        for value in [0.0f64, -2.25, 1.0e300, f64::MIN_POSITIVE] {
            let bytes = value.to_be_bytes();
            let decoded = as_float(DataTag::Float64, &bytes);
            assert_eq!(decoded.to_bits(), value.to_bits());
        }
    }

    #[test]
    fn test_as_float_insufficient_or_non_numeric() {
        assert_eq!(as_float(DataTag::Uint32, &[0x01, 0x02]), 0.0);
        assert_eq!(as_float(DataTag::OctetString, b"abc"), 0.0);
        assert_eq!(as_float(DataTag::Uint8, &[]), 0.0);
    }

    #[test]
    fn test_as_string_text_and_numbers() {
        assert_eq!(as_string(DataTag::VisibleString, b"meter-01"), "meter-01");
        assert_eq!(as_string(DataTag::Int16, &[0xFF, 0x9C]), "-100");
        assert_eq!(as_string(DataTag::Enum, &[0x1E]), "30");
        assert_eq!(as_string(DataTag::BitString, &[0xDE, 0xAD]), "dead");
        assert_eq!(as_string(DataTag::None, &[]), "");
    }

    #[test]
    fn test_as_string_date_time() {
        let buf = [
            0x07, 0xE8, 0x01, 0x0F, 0x01, 0x0E, 0x1E, 0x2D, 0xFF, 0x80, 0x00, 0x00,
        ];
        assert_eq!(as_string(DataTag::DateTime, &buf), "2024-01-15 14:30:45");
    }
}
