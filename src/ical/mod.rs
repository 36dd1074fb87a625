//! This module handles the calendar feed, which uses the iCal format
//!
//! Only a handful of fields are extracted from every `VEVENT`. Everything else is ignored.

mod parser;
pub use parser::{parse, FeedOccurrences};
