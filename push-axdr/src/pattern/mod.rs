//! Descriptor patterns: byte-layout hypotheses for attribute descriptors
//!
//! A pattern is an ordered list of typed match steps, usually compiled
//! from the textual DSL (see [`Pattern::from_dsl`]). Nesting is part of
//! the step tree itself: a [`Step::Structure`] carries its child steps,
//! so an unbalanced nesting cannot be expressed at all.

pub mod dsl;
pub(crate) mod matcher;
pub mod registry;

use push_core::DataTag;

/// Extra constraints for a generic value capture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueRule {
    /// Require this exact tag on the wire
    pub expect_tag: Option<DataTag>,
    /// For variable-length tags, require this exact payload length
    pub expect_len: Option<u8>,
    /// Report the capture under this tag instead of the wire tag
    pub reinterpret: Option<DataTag>,
}

/// One match step of a descriptor pattern
///
/// Steps execute strictly in order; the first failing step aborts the
/// whole attempt. Only steps completing at the top nesting level count
/// toward the enclosing sequence's consumed-element total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Only matches at the first element of the enclosing sequence
    First,
    /// Require this exact tag byte; with `put_back` the byte is left
    /// unconsumed for the following step
    ExactTag { tag: DataTag, put_back: bool },
    /// Require an INT8 or UINT8 tag byte
    AnyInt8Tag,
    /// Capture an untagged big-endian 2-byte class id
    ClassId,
    /// Capture a tagged OBIS code (octet-string tag, length 6)
    ObisTagged,
    /// Capture 6 raw OBIS bytes, no tag
    ObisUntagged,
    /// Consume an untagged 1-byte attribute id; zero is invalid
    AttributeId,
    /// Capture a tagged value of any non-container type
    Value(ValueRule),
    /// Capture a tagged scaler (INT8 tag + 1 byte)
    Scaler,
    /// Capture a tagged unit (ENUM tag + 1 byte)
    Unit,
    /// Require a structure with exactly `count` elements, then run the
    /// child steps one nesting level deeper
    Structure { count: u8, children: Vec<Step> },
}

/// A compiled descriptor pattern
///
/// Immutable once registered. Lower priority values are tried first;
/// registration order breaks ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub name: String,
    pub priority: i32,
    pub steps: Vec<Step>,
    /// Substituted at emission when the pattern captures no class id
    pub default_class_id: u16,
}

impl Pattern {
    /// Set the class id reported for matches that do not capture one
    pub fn with_default_class_id(mut self, class_id: u16) -> Self {
        self.default_class_id = class_id;
        self
    }
}
