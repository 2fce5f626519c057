//! Snapshot Persistence
//!
//! The snapshot is the only contract with the dashboard. It is rewritten in
//! full on every run through a temporary sibling file and a rename, so the
//! dashboard sees either the previous document or the new one.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ranking::{top_n, RankOrder};
use super::row::EnrichedRow;

/// Default snapshot file name
pub const DEFAULT_SNAPSHOT_FILE: &str = "data.json";

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to serialize snapshot: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to create directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One pipeline run's complete output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub updated_at: DateTime<Utc>,
    pub rows: Vec<EnrichedRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_low_volatility: Option<Vec<EnrichedRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_volatility: Option<Vec<EnrichedRow>>,
}

impl Snapshot {
    /// Build a snapshot from rows already ranked in `order`
    pub fn new(updated_at: DateTime<Utc>, ranked: Vec<EnrichedRow>, order: RankOrder, top: usize) -> Self {
        let subset = top_n(&ranked, top);
        let (top_low_volatility, top_volatility) = match order {
            RankOrder::LowestVolatility => (Some(subset), None),
            RankOrder::HighestVolatility => (None, Some(subset)),
        };

        Self {
            updated_at,
            rows: ranked,
            top_low_volatility,
            top_volatility,
        }
    }

    /// The precomputed subset, whichever direction it was ranked in
    pub fn top(&self) -> &[EnrichedRow] {
        self.top_low_volatility
            .as_deref()
            .or(self.top_volatility.as_deref())
            .unwrap_or(&[])
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Replace the document at `path` with this snapshot
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SnapshotError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = self.to_json()?;
        let tmp = temp_path(path);

        fs::write(&tmp, content).map_err(|source| SnapshotError::Write {
            path: tmp.clone(),
            source,
        })?;

        if let Err(source) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(SnapshotError::Write {
                path: path.to_path_buf(),
                source,
            });
        }

        tracing::info!(
            "Snapshot saved: {} rows, {} top -> {}",
            self.rows.len(),
            self.top().len(),
            path.display()
        );

        Ok(())
    }

    /// Load the document at `path`
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_SNAPSHOT_FILE.to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::StabilityLabel;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn row(pair: &str, volatility: f64) -> EnrichedRow {
        EnrichedRow {
            pair: pair.to_string(),
            display_name: format!("{} Name", pair),
            short_symbol: pair.to_string(),
            chain_id: "56".to_string(),
            contract_address: "0xdef".to_string(),
            price_change_percent: -1.25,
            quote_volume: 123_456_789.5,
            open_price: 0.000123,
            high_price: 0.000130,
            low_price: 0.000120,
            volatility,
            stability: StabilityLabel::classify(volatility),
            listed_days: Some(4),
            recent_on_target_chain: true,
        }
    }

    fn sample(order: RankOrder) -> Snapshot {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        Snapshot::new(at, vec![row("A", 0.01), row("B", 0.02), row("C", 0.3)], order, 2)
    }

    #[test]
    fn test_top_subset_key_follows_order() {
        let low = serde_json::to_value(sample(RankOrder::LowestVolatility)).unwrap();
        assert_eq!(low["topLowVolatility"].as_array().unwrap().len(), 2);
        assert!(low.get("topVolatility").is_none());

        let high = serde_json::to_value(sample(RankOrder::HighestVolatility)).unwrap();
        assert_eq!(high["topVolatility"].as_array().unwrap().len(), 2);
        assert!(high.get("topLowVolatility").is_none());
    }

    #[test]
    fn test_updated_at_is_iso8601() {
        let value = serde_json::to_value(sample(RankOrder::LowestVolatility)).unwrap();
        let stamp = value["updatedAt"].as_str().unwrap();
        assert!(stamp.starts_with("2026-10-19T12:00:00"));
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[test]
    fn test_json_round_trip_preserves_rows() {
        let snapshot = sample(RankOrder::LowestVolatility);
        let restored = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(restored, snapshot);
        assert_eq!(restored.top().len(), 2);
    }

    #[test]
    fn test_save_creates_dir_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs").join("data.json");

        sample(RankOrder::LowestVolatility).save(&path).unwrap();
        let first = Snapshot::load(&path).unwrap();
        assert_eq!(first.rows.len(), 3);

        let at = Utc.with_ymd_and_hms(2026, 10, 20, 0, 0, 0).unwrap();
        Snapshot::new(at, vec![row("Z", 0.5)], RankOrder::LowestVolatility, 10)
            .save(&path)
            .unwrap();

        let second = Snapshot::load(&path).unwrap();
        assert_eq!(second.rows.len(), 1);
        assert_eq!(second.rows[0].pair, "Z");
        assert!(!dir.path().join("docs").join(".data.json.tmp").exists());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = Snapshot::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(SnapshotError::Read { .. })));
    }

    #[test]
    fn test_load_corrupted_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{ invalid json }").unwrap();
        assert!(matches!(Snapshot::load(&path), Err(SnapshotError::Serialization(_))));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let tmp = temp_path(Path::new("/srv/docs/data.json"));
        assert_eq!(tmp, Path::new("/srv/docs/.data.json.tmp"));
    }
}
