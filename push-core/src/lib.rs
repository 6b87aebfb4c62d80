//! Core types and utilities for DLMS/COSEM push notification decoding
//!
//! This crate provides the foundation shared by the push decoder:
//! error handling, OBIS codes, the A-XDR tag vocabulary with its size
//! table, the value codec and the datetime heuristic.

pub mod error;
pub mod obis_code;
pub mod datatypes;

pub use error::{PushError, PushResult};
pub use obis_code::ObisCode;
pub use datatypes::{DataTag, TagSize};
