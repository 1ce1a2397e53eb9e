//! Vitals input schema
//!
//! This module defines the loosely-typed producer input: individual readings
//! as a tagged union, the record that groups them, and batch decoding.

mod adapter;
mod record;
mod value;

pub use adapter::*;
pub use record::*;
pub use value::{LevelLabel, VitalValue};
pub(crate) use value::{clean_numeric, parse_number};
