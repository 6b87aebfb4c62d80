use crate::error::{PushError, PushResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// OBIS (Object Identification System) code identifying a COSEM object
///
/// OBIS codes are 6-byte identifiers used in DLMS/COSEM to address a
/// specific metering quantity. Push notification frames carry them next
/// to every reported value; consumers typically key their sensor maps
/// by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObisCode {
    bytes: [u8; 6],
}

impl ObisCode {
    /// Create a new OBIS code from the six group values A through F
    pub fn new(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> Self {
        Self {
            bytes: [a, b, c, d, e, f],
        }
    }

    /// Create an OBIS code from a raw 6-byte array
    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        Self { bytes }
    }

    /// Get the OBIS code as a byte array
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.bytes
    }

    /// Get the OBIS code as a copied byte array
    pub fn to_bytes(&self) -> [u8; 6] {
        self.bytes
    }
}

impl TryFrom<&[u8]> for ObisCode {
    type Error = PushError;

    fn try_from(slice: &[u8]) -> PushResult<Self> {
        let bytes: [u8; 6] = slice.try_into().map_err(|_| {
            PushError::InvalidData(format!("OBIS code needs 6 bytes, got {}", slice.len()))
        })?;
        Ok(Self { bytes })
    }
}

impl FromStr for ObisCode {
    type Err = PushError;

    /// Parse the dot format, e.g. "1.0.1.8.0.255"
    fn from_str(s: &str) -> PushResult<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 6 {
            return Err(PushError::InvalidData(format!(
                "Expected 6 dot-separated values in OBIS code, got {}",
                parts.len()
            )));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = part
                .trim()
                .parse::<u8>()
                .map_err(|_| PushError::InvalidData(format!("Invalid OBIS byte value: {}", part)))?;
        }

        Ok(Self { bytes })
    }
}

impl fmt::Display for ObisCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}.{}.{}",
            self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3], self.bytes[4], self.bytes[5]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obis_code_new() {
        let code = ObisCode::new(1, 0, 1, 8, 0, 255);
        assert_eq!(code.as_bytes(), &[1, 0, 1, 8, 0, 255]);
    }

    #[test]
    fn test_obis_code_from_str() {
        let code: ObisCode = "1.0.1.8.0.255".parse().unwrap();
        assert_eq!(code, ObisCode::new(1, 0, 1, 8, 0, 255));
    }

    #[test]
    fn test_obis_code_from_str_rejects_garbage() {
        assert!("1.0.1.8.0".parse::<ObisCode>().is_err());
        assert!("1.0.1.8.0.300".parse::<ObisCode>().is_err());
    }

    #[test]
    fn test_obis_code_display() {
        let code = ObisCode::new(1, 0, 1, 8, 0, 255);
        assert_eq!(format!("{}", code), "1.0.1.8.0.255");
    }

    #[test]
    fn test_obis_code_try_from_slice() {
        let raw = [0x01u8, 0x00, 0x01, 0x08, 0x00, 0xFF];
        let code = ObisCode::try_from(&raw[..]).unwrap();
        assert_eq!(code.to_bytes(), raw);
        assert!(ObisCode::try_from(&raw[..5]).is_err());
    }
}
