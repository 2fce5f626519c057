//! Domain Layer - Core logic of the alpha snapshot pipeline
//!
//! Pure types and functions with no network access. Market data reaches the
//! domain through the ports layer.
//!
//! - `metadata`: multi-key token metadata index
//! - `universe`: tradable pair selection
//! - `metrics`: range volatility, change and stability buckets
//! - `chain`: target chain alias matching
//! - `row`: the enriched row emitted to the dashboard
//! - `ranking`: row filters, volatility ordering, top-N slicing
//! - `snapshot`: the persisted document and its atomic writer

pub mod metadata;
pub mod universe;
pub mod metrics;
pub mod chain;
pub mod row;
pub mod ranking;
pub mod snapshot;

pub use metadata::{MetadataIndex, TokenMetadata, TokenRecord, normalize_key};
pub use universe::{TradingPair, select_universe, STATUS_TRADING};
pub use metrics::{PriceWindow, StabilityLabel, listed_days, MS_PER_DAY};
pub use chain::ChainMatcher;
pub use row::{EnrichedRow, PairQuote, RowInputs};
pub use ranking::{FilterPolicy, RankOrder, rank, top_n};
pub use snapshot::{Snapshot, SnapshotError, DEFAULT_SNAPSHOT_FILE};
