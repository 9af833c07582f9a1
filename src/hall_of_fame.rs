//! Best finished runs, persisted as a small JSON table.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, LoadResult, SaveError};

pub const HALL_SIZE: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallRecord {
    pub player: String,
    pub score: i32,
    pub recorded_at: DateTime<Utc>,
}

/// At most [`HALL_SIZE`] records, highest score first. Equal scores keep
/// the order they were submitted in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallOfFame {
    records: Vec<HallRecord>,
}

impl HallOfFame {
    /// Reads the table at `path`. A missing file is an empty table.
    pub fn load(path: &Path) -> LoadResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut hall: HallOfFame = serde_json::from_str(&json)?;
        hall.settle();
        tracing::debug!(
            path = %path.display(),
            records = hall.records.len(),
            "loaded hall of fame"
        );
        Ok(hall)
    }

    pub fn records(&self) -> &[HallRecord] {
        &self.records
    }

    /// Printable rows, headed by a title line.
    pub fn table(&self) -> Vec<String> {
        let mut lines = vec!["Hall of fame:".to_string()];
        for (rank, record) in self.records.iter().enumerate() {
            lines.push(format!("{}. {} {}", rank + 1, record.player, record.score));
        }
        lines
    }

    /// Enters a finished run. Returns its zero-based rank, or `None` when
    /// the score did not make the table.
    pub fn submit(&mut self, player: impl Into<String>, score: i32) -> Option<usize> {
        self.submit_at(player, score, Utc::now())
    }

    pub fn submit_at(
        &mut self,
        player: impl Into<String>,
        score: i32,
        recorded_at: DateTime<Utc>,
    ) -> Option<usize> {
        self.records.push(HallRecord {
            player: player.into(),
            score,
            recorded_at,
        });
        let entered = self.records.len() - 1;
        // Stable sort: ties stay in submission order, so the new record
        // lands after any equal score.
        let mut indexed = self.records.drain(..).enumerate().collect::<Vec<_>>();
        indexed.sort_by(|(_, a), (_, b)| b.score.cmp(&a.score));
        let rank = indexed.iter().position(|(idx, _)| *idx == entered);
        self.records = indexed.into_iter().map(|(_, record)| record).collect();
        self.records.truncate(HALL_SIZE);
        rank.filter(|rank| *rank < HALL_SIZE)
    }

    pub fn save(&self, path: &Path) -> Result<(), SaveError> {
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SaveError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let temp_path: PathBuf = path.with_extension("json.tmp");
        fs::write(&temp_path, json).map_err(|source| SaveError::Io {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, path).map_err(|source| SaveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "saved hall of fame");
        Ok(())
    }

    fn settle(&mut self) {
        self.records.sort_by(|a, b| b.score.cmp(&a.score));
        self.records.truncate(HALL_SIZE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
    }

    #[test]
    fn keeps_the_five_best_with_ties_in_submission_order() {
        let mut hall = HallOfFame::default();
        for (minute, score) in [40, 80, 60, 80, 20].into_iter().enumerate() {
            hall.submit_at(format!("p{minute}"), score, at(minute as u32));
        }
        assert_eq!(hall.submit_at("late", 10, at(9)), None);
        assert_eq!(hall.submit_at("tie", 60, at(10)), Some(3));

        let names = hall
            .records()
            .iter()
            .map(|record| record.player.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["p1", "p3", "p2", "tie", "p0"]);
        assert_eq!(hall.table().len(), 6);
        assert_eq!(hall.table()[4], "4. tie 60");
    }

    #[test]
    fn missing_file_is_an_empty_table_and_saves_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records").join("records.json");
        let mut hall = HallOfFame::load(&path).unwrap();
        assert!(hall.records().is_empty());

        hall.submit_at("ada", 57, at(1));
        hall.save(&path).unwrap();
        assert_eq!(HallOfFame::load(&path).unwrap(), hall);
    }
}
