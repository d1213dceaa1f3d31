//! Directory walking, header reads and series aggregation
//!
//! - [`walker`] - lazy traversal with the `DICM` magic predicate
//! - [`series`] - per-series records keyed by (patient, study, series)
//! - [`aggregate`] - description-grouped report with grand totals

pub mod aggregate;
pub mod series;
pub mod walker;

pub use aggregate::{aggregate_by_description, DescriptionGroup, SeriesReport};
pub use series::{index, SeriesIndex};
pub use walker::{is_supported, read_header, resolves_to_file, DicomWalker, ScanEntry, SkipCounts};
