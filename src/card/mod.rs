//! Heuristic extraction of event cards from free-form result listings and
//! their canonical re-rendering.

pub mod dates;
pub mod format;
pub mod matches;
pub mod resolve;
pub mod segment;

pub use format::{format_event, format_events};
pub use segment::segment;
