//! Normalizes hand-written wrestling result listings into one canonical
//! document per calendar year.

pub mod aggregate;
pub mod card;
pub mod config;
pub mod error;
pub mod json;
pub mod markdown;
pub mod observer;
pub mod output;
pub mod pipeline;
pub mod reader;
pub mod types;
pub mod year;

pub use config::Config;
pub use error::{Diagnostics, ProcessError};
pub use observer::{NullObserver, Observer, TracingObserver};
pub use pipeline::{ProcessingRun, process_documents};
pub use types::{DateCandidate, Event, Match, Outcome, SeriesFile, YearBundle};
pub use year::YearExtractor;
