//! # logcodec-feem
//!
//! The Sonic fee-monetization (FeeM) contract's events as a Rust sum type,
//! the mapper from generic decoded logs onto it, and the flat row shape used
//! for analytical sinks.

pub mod event;
pub mod mapper;
pub mod row;

pub use event::{Column, DecodedEvent, FeemEvent};
pub use mapper::{map_event, MapError};
pub use row::{DuplicateRow, EventRow};
