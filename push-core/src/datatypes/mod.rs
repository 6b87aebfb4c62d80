//! A-XDR data type vocabulary and value decoding

pub mod tag;
pub mod value;
pub mod date_time;

pub use tag::{DataTag, TagSize};
pub use value::{as_float, as_string};
pub use date_time::{format_date_time, looks_like_date_time, DATE_TIME_LENGTH};
