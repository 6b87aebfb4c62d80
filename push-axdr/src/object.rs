//! Decoded objects and the sink they are delivered to

use push_core::datatypes::{as_float, as_string};
use push_core::{DataTag, ObisCode};
use serde::{Deserialize, Serialize};

/// One attribute descriptor extracted from a push frame
///
/// The value bytes alias the shared input buffer and are only valid
/// until the next decode call or buffer mutation; use
/// [`DecodedObject::to_owned`] to retain a copy.
#[derive(Debug, Clone)]
pub struct DecodedObject<'a> {
    pub class_id: u16,
    pub obis: ObisCode,
    pub value_type: DataTag,
    pub value: &'a [u8],
    /// Power-of-ten multiplier, when the frame carried one
    pub scaler: Option<i8>,
    /// DLMS unit code, when the frame carried one
    pub unit: Option<u8>,
}

impl<'a> DecodedObject<'a> {
    /// Numeric interpretation of the raw value
    pub fn as_float(&self) -> f64 {
        as_float(self.value_type, self.value)
    }

    /// Textual interpretation of the raw value
    pub fn as_string(&self) -> String {
        as_string(self.value_type, self.value)
    }

    /// Numeric value with the scaler applied
    pub fn scaled_value(&self) -> f64 {
        let scale = 10f64.powi(self.scaler.unwrap_or(0) as i32);
        self.as_float() * scale
    }

    /// Copy the object out of the shared buffer
    pub fn to_owned(&self) -> OwnedObject {
        OwnedObject {
            class_id: self.class_id,
            obis: self.obis,
            value_type: self.value_type,
            value: self.value.to_vec(),
            scaler: self.scaler,
            unit: self.unit,
        }
    }
}

/// An attribute descriptor detached from the input buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedObject {
    pub class_id: u16,
    pub obis: ObisCode,
    pub value_type: DataTag,
    #[serde(with = "serde_bytes")]
    pub value: Vec<u8>,
    pub scaler: Option<i8>,
    pub unit: Option<u8>,
}

/// Receiver for decoded objects
///
/// Injected into the parser at construction; invoked synchronously,
/// zero or more times per decode call.
pub trait ObjectSink {
    fn on_object(&mut self, object: &DecodedObject<'_>);
}

impl<F> ObjectSink for F
where
    F: FnMut(&DecodedObject<'_>),
{
    fn on_object(&mut self, object: &DecodedObject<'_>) {
        self(object)
    }
}
