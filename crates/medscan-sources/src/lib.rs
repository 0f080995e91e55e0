//! External drug-information lookup: one adapter per provider, a
//! partial-failure-tolerant fan-out, and the field-by-field merge that
//! reconciles every answer into a single record.

pub mod adapters;
mod aggregator;
mod merge;
mod source;

pub use aggregator::{AggregatorConfig, DrugInfoAggregator, LookupOutcome, SourceFailure};
pub use merge::{DEFAULT_SOURCE_PRIORITY, merge_results};
pub use reqwest::Client;
pub use source::{DrugInfoSource, SourceError, SourceFuture};
