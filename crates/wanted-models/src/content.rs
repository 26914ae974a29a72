use crate::record::{MediaKind, WantedRecord};
use serde::{Deserialize, Serialize};

/// Aggregate counters shown above the list
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WantedStats {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub movies: usize,
    #[serde(default)]
    pub series: usize,
    /// Records flagged as missing their required external id
    #[serde(default)]
    pub missing: usize,
    #[serde(default)]
    pub in_radarr: usize,
    #[serde(default)]
    pub in_sonarr: usize,
}

impl WantedStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a WantedRecord>) -> Self {
        let mut stats = WantedStats::default();
        for record in records {
            stats.total += 1;
            match record.media_type {
                MediaKind::Movie => stats.movies += 1,
                MediaKind::Series => stats.series += 1,
            }
            if record.missing_external {
                stats.missing += 1;
            }
            if record.in_radarr {
                stats.in_radarr += 1;
            }
            if record.in_sonarr {
                stats.in_sonarr += 1;
            }
        }
        stats
    }
}

/// Full, unfiltered list as returned by the content endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WantedContent {
    #[serde(default)]
    pub rows: Vec<WantedRecord>,
    /// Server-side counters; recomputed from `rows` when absent
    #[serde(default)]
    pub stats: Option<WantedStats>,
}

impl WantedContent {
    pub fn stats(&self) -> WantedStats {
        self.stats.unwrap_or_else(|| WantedStats::from_records(&self.rows))
    }
}
