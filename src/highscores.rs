//! High score leaderboard
//!
//! Persisted as a JSON file, keeps the top 10 runs by score.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::sim::RunSummary;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    /// Wave reached
    pub wave: u32,
    pub score: u64,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

/// On-disk shape, checked one entry at a time
#[derive(Deserialize)]
struct RawHighScores {
    #[serde(default)]
    entries: Vec<serde_json::Value>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Must beat the lowest entry
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Get the rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a finished run if it qualifies.
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify
    pub fn record(&mut self, name: &str, run: RunSummary) -> Option<usize> {
        if !self.qualifies(run.score) {
            return None;
        }

        let entry = HighScoreEntry {
            name: name.to_string(),
            wave: run.wave,
            score: run.score,
        };

        // Ties keep the earlier run ahead
        let pos = self.entries.iter().position(|e| run.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from `path`; a missing file is an empty leaderboard. Entries
    /// that don't parse are skipped.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        if !path.exists() {
            log::info!("No high scores at {}, starting fresh", path.display());
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        let raw: RawHighScores = serde_json::from_str(&json)?;
        let mut scores = Self::new();
        for value in raw.entries {
            match serde_json::from_value::<HighScoreEntry>(value) {
                Ok(entry) => scores.entries.push(entry),
                Err(e) => log::warn!("Skipping malformed high score entry: {e}"),
            }
        }
        // Hand-edited files may be out of order or too long
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(score: u64, wave: u32) -> RunSummary {
        RunSummary { score, wave }
    }

    #[test]
    fn test_record_keeps_descending_order() {
        let mut scores = HighScores::new();
        assert_eq!(scores.record("a", run(100, 2)), Some(1));
        assert_eq!(scores.record("b", run(300, 4)), Some(1));
        assert_eq!(scores.record("c", run(200, 3)), Some(2));
        let order: Vec<&str> = scores.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert_eq!(scores.top_score(), Some(300));
    }

    #[test]
    fn test_keeps_top_ten() {
        let mut scores = HighScores::new();
        for i in 1..=12 {
            scores.record("p", run(i * 10, 1));
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(30));
        assert!(!scores.qualifies(30));
        assert_eq!(scores.potential_rank(35), Some(10));
        assert_eq!(scores.record("late", run(20, 1)), None);
    }

    #[test]
    fn test_zero_score_run_is_kept_while_board_has_room() {
        let mut scores = HighScores::new();
        assert_eq!(scores.record("x", run(0, 3)), Some(1));
        assert_eq!(scores.entries.len(), 1);
        assert_eq!(scores.record("y", run(5, 1)), Some(1));
        assert_eq!(scores.entries.last().map(|e| e.name.as_str()), Some("x"));
    }

    #[test]
    fn test_zero_score_does_not_displace_full_board() {
        let mut scores = HighScores::new();
        for _ in 0..MAX_HIGH_SCORES {
            scores.record("p", run(0, 1));
        }
        assert!(!scores.qualifies(0));
        assert_eq!(scores.record("late", run(0, 1)), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("last-stand-scores-{}", std::process::id()));
        let path = dir.join("scores.json");
        let mut scores = HighScores::new();
        scores.record("ada", run(1234, 7));
        scores.save(&path).expect("save");

        let loaded = HighScores::load(&path).expect("load");
        assert_eq!(loaded, scores);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let path = std::env::temp_dir().join("last-stand-definitely-missing.json");
        assert!(HighScores::load(&path).expect("load").is_empty());
    }

    #[test]
    fn test_load_skips_malformed_entries() {
        let path = std::env::temp_dir().join(format!("last-stand-partial-{}.json", std::process::id()));
        let json = r#"{ "entries": [
            { "name": "low", "wave": 2, "score": 10 },
            { "name": "broken", "wave": "three" },
            { "name": "high", "wave": 9, "score": 900 }
        ] }"#;
        std::fs::write(&path, json).expect("write");
        let loaded = HighScores::load(&path).expect("load");
        let names: Vec<&str> = loaded.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["high", "low"]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let path = std::env::temp_dir().join(format!("last-stand-garbage-{}.json", std::process::id()));
        std::fs::write(&path, "not json").expect("write");
        assert!(matches!(HighScores::load(&path), Err(StorageError::Json(_))));
        let _ = std::fs::remove_file(&path);
    }
}
