//! Runtime configuration read from the process environment.
use std::env;
use std::path::PathBuf;

use crate::data::LevelId;

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub rooms_dir: PathBuf,
    /// `None` disables checkpoint persistence.
    pub save_dir: Option<PathBuf>,
    pub records_path: PathBuf,
    pub seed: Option<u64>,
    pub player: String,
    /// Command script to run headlessly instead of opening the terminal.
    pub script: Option<PathBuf>,
    pub first_level: LevelId,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rooms_dir: PathBuf::from("rooms"),
            save_dir: Some(PathBuf::from("saves")),
            records_path: PathBuf::from("records").join("records.json"),
            seed: None,
            player: "hero".to_string(),
            script: None,
            first_level: LevelId::new("room0"),
        }
    }
}

impl GameConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ROGUE_ROOMS_DIR` - Directory of level files (default: `rooms`)
    /// - `ROGUE_SAVE_DIR` - Checkpoint directory, empty disables (default: `saves`)
    /// - `ROGUE_RECORDS` - Hall of fame file (default: `records/records.json`)
    /// - `ROGUE_SEED` - RNG seed (default: entropy)
    /// - `ROGUE_PLAYER` - Name recorded on a win (default: `hero`)
    /// - `ROGUE_SCRIPT` - Command script for a headless run
    /// - `ROGUE_FIRST_LEVEL` - Starting level id (default: `room0`)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = read_env::<PathBuf>("ROGUE_ROOMS_DIR") {
            config.rooms_dir = dir;
        }
        if let Ok(dir) = env::var("ROGUE_SAVE_DIR") {
            config.save_dir = (!dir.trim().is_empty()).then(|| PathBuf::from(dir));
        }
        if let Some(path) = read_env::<PathBuf>("ROGUE_RECORDS") {
            config.records_path = path;
        }
        if let Some(seed) = read_env::<u64>("ROGUE_SEED") {
            config.seed = Some(seed);
        }
        if let Some(player) = read_env::<String>("ROGUE_PLAYER").filter(|name| !name.is_empty()) {
            config.player = player;
        }
        if let Some(script) = read_env::<PathBuf>("ROGUE_SCRIPT") {
            config.script = Some(script);
        }
        if let Some(level) = read_env::<String>("ROGUE_FIRST_LEVEL").filter(|id| !id.is_empty()) {
            config.first_level = LevelId::new(level);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
