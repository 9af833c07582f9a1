//! Level files on disk and the checkpoint save slot.
//!
//! ```text
//! rooms/            saves/
//! ├── room0.txt     ├── save.txt          level text at the last checkpoint
//! ├── room1.txt     └── checkpoint.json   hero fields + the same level text
//! └── room2.txt
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use bracket_geometry::prelude::Point;
use serde::{Deserialize, Serialize};

use crate::{
    data::{HeroStatus, LevelId, items::ItemKind},
    engine::Checkpoint,
    error::{LoadError, LoadResult, SaveError},
    level::Blueprint,
};

const SAVE_FILE: &str = "save.txt";
const CHECKPOINT_FILE: &str = "checkpoint.json";

/// Reads every regular file in `dir` as a level, ordered by file name.
///
/// The level id is the file stem. Files that fail to read or parse are
/// logged and skipped.
pub fn load_rooms(dir: impl AsRef<Path>) -> LoadResult<Vec<(LevelId, Blueprint)>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file())
        .collect::<Vec<PathBuf>>();
    paths.sort();

    let mut levels = Vec::new();
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        match read_blueprint(&path) {
            Ok(blueprint) => {
                tracing::debug!(level = stem, records = blueprint.records.len(), "loaded level");
                levels.push((LevelId::new(stem), blueprint));
            }
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "skipping level file"),
        }
    }

    if levels.is_empty() {
        return Err(LoadError::NoLevels(dir.to_path_buf()));
    }
    Ok(levels)
}

pub fn read_blueprint(path: &Path) -> LoadResult<Blueprint> {
    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    source.parse()
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> SaveError {
    let path = path.to_path_buf();
    move |source| SaveError::Io { path, source }
}

#[derive(Serialize, Deserialize)]
struct StoredCheckpoint {
    level: LevelId,
    x: i32,
    y: i32,
    hp: i32,
    status: HeroStatus,
    items: Vec<ItemKind>,
    score: i32,
    blueprint: String,
}

/// Directory holding the most recent checkpoint.
#[derive(Clone, Debug)]
pub struct SaveSlot {
    dir: PathBuf,
}

impl SaveSlot {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn store(&self, checkpoint: &Checkpoint) -> Result<(), SaveError> {
        fs::create_dir_all(&self.dir).map_err(write_error(&self.dir))?;

        let text = checkpoint.blueprint.to_string();
        let save_path = self.dir.join(SAVE_FILE);
        fs::write(&save_path, &text).map_err(write_error(&save_path))?;

        let stored = StoredCheckpoint {
            level: checkpoint.level.clone(),
            x: checkpoint.point.x,
            y: checkpoint.point.y,
            hp: checkpoint.hp,
            status: checkpoint.status,
            items: checkpoint.items.clone(),
            score: checkpoint.score,
            blueprint: text,
        };
        let json = serde_json::to_string_pretty(&stored)?;
        let path = self.dir.join(CHECKPOINT_FILE);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json).map_err(write_error(&temp_path))?;
        fs::rename(&temp_path, &path).map_err(write_error(&path))?;

        tracing::debug!(path = %path.display(), "stored checkpoint");
        Ok(())
    }

    /// The stored checkpoint, or `None` when nothing was saved yet. A
    /// checkpoint that fails [`Checkpoint::validate`] is an error.
    pub fn load(&self) -> LoadResult<Option<Checkpoint>> {
        let path = self.dir.join(CHECKPOINT_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let stored: StoredCheckpoint = serde_json::from_str(&json)?;
        let blueprint = stored.blueprint.parse::<Blueprint>()?;

        let checkpoint = Checkpoint {
            level: stored.level,
            point: Point::new(stored.x, stored.y),
            hp: stored.hp,
            status: stored.status,
            items: stored.items,
            score: stored.score,
            blueprint,
        };
        checkpoint.validate()?;

        tracing::debug!(level = %checkpoint.level, score = checkpoint.score, "loaded checkpoint");
        Ok(Some(checkpoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::KeyId;

    fn checkpoint() -> Checkpoint {
        let source = format!("{}\nBat,3,3\nDoor,9,4,room1,1,4,gold\n", "#         \n".repeat(10));
        Checkpoint {
            level: LevelId::new("room0"),
            point: Point::new(1, 4),
            hp: 7,
            status: HeroStatus::Poisoned,
            items: vec![ItemKind::Sword, ItemKind::Key(KeyId::new("gold"))],
            score: 88,
            blueprint: source.parse().unwrap(),
        }
    }

    #[test]
    fn stored_checkpoint_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let slot = SaveSlot::new(dir.path().join("saves"));
        assert!(slot.load().unwrap().is_none());

        let original = checkpoint();
        slot.store(&original).unwrap();
        assert_eq!(slot.load().unwrap(), Some(original));

        let save = fs::read_to_string(dir.path().join("saves").join(SAVE_FILE)).unwrap();
        assert!(save.starts_with("#         \n"));
        assert!(save.ends_with("Bat,3,3\nDoor,9,4,room1,1,4,gold\n"));
    }

    #[test]
    fn rooms_are_sorted_and_bad_files_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let grid = "          \n".repeat(10);
        fs::write(dir.path().join("room1.txt"), format!("{grid}\nThug,2,2\n")).unwrap();
        fs::write(dir.path().join("room0.txt"), format!("{grid}\nBat,2,2\n")).unwrap();
        fs::write(dir.path().join("broken.txt"), "###\n").unwrap();

        let levels = load_rooms(dir.path()).unwrap();
        let ids = levels.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["room0", "room1"]);
    }

    #[test]
    fn empty_room_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_rooms(dir.path()), Err(LoadError::NoLevels(_))));
        assert!(matches!(
            load_rooms(dir.path().join("missing")),
            Err(LoadError::Io { .. })
        ));
    }
}
