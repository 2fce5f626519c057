//! Application Layer
//!
//! Use cases wiring the market data port to the domain: a single snapshot
//! run and the interval watcher around it.

pub mod pipeline;
pub mod watcher;

pub use pipeline::{
    PairOutcome, PipelineConfig, PipelineError, RunReport, RunSummary, SkipReason,
    SnapshotPipeline,
};
pub use watcher::{SnapshotWatcher, WatcherStatus, DEFAULT_WATCH_INTERVAL};
