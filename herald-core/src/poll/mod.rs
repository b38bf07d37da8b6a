//! Change detection against the games database.
//!
//! Each watched table gets its own [`PollRunner`] driving an
//! [`EventStream`] on an independent schedule, so a slow or failing
//! stream never delays the others.

pub mod classifier;
pub mod interval;
pub mod runner;
pub mod source;

pub use classifier::{ClassifyConfig, Decision, EventClassifier, NoCatalog, PoolCatalog};
pub use interval::error_backoff;
pub use runner::PollRunner;
pub use source::{EventStream, PgGameCatalog, PgPoolStream, PgWinnerStream, SourceError};
