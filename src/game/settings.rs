use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::game::store::default_data_dir;
use crate::model::Difficulty;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_version")]
    version: u32,

    #[serde(default)]
    pub difficulty: Difficulty,

    #[serde(default)]
    pub move_limit_enabled: bool,

    #[serde(default)]
    pub muted: bool,

    /// Backing file; in-memory settings (tests, ephemeral runs) have none
    /// and `save` is a no-op for them.
    #[serde(skip)]
    path: Option<PathBuf>,
}

fn default_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: 1,
            difficulty: Difficulty::default(),
            move_limit_enabled: false,
            muted: false,
            path: None,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from(Self::settings_path())
    }

    pub fn load_from(path: PathBuf) -> Self {
        if let Ok(contents) = fs::read_to_string(&path) {
            if let Ok(mut settings) = serde_json::from_str::<Settings>(&contents) {
                settings.path = Some(path);
                settings.migrate();
                return settings;
            }
        }
        let mut default = Settings::default();
        default.path = Some(path);
        let _ = default.save();
        default
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(()),
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string(self)?;
        fs::write(path, contents)
    }

    fn settings_path() -> PathBuf {
        default_data_dir().join("settings.json")
    }

    fn migrate(&mut self) {
        match self.version {
            0 => {
                self.version = 1;
            }
            _ => (),
        }
    }

    pub fn seed_from_env() -> Option<u64> {
        std::env::var("SEED").ok().and_then(|v| v.parse::<u64>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("pairvault-settings-{}", uuid::Uuid::new_v4()))
            .join("settings.json")
    }

    #[test]
    fn test_load_missing_file_yields_defaults_and_writes_them() {
        let path = scratch_path();
        let settings = Settings::load_from(path.clone());
        assert_eq!(settings.difficulty, Difficulty::Medium);
        assert!(!settings.move_limit_enabled);
        assert!(path.exists());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_save_and_reload() {
        let path = scratch_path();
        let mut settings = Settings::load_from(path.clone());
        settings.difficulty = Difficulty::Hard;
        settings.move_limit_enabled = true;
        settings.save().unwrap();

        let reloaded = Settings::load_from(path.clone());
        assert_eq!(reloaded.difficulty, Difficulty::Hard);
        assert!(reloaded.move_limit_enabled);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let path = scratch_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let settings = Settings::load_from(path.clone());
        assert_eq!(settings.difficulty, Difficulty::Medium);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_in_memory_settings_save_is_noop() {
        let settings = Settings::default();
        assert!(settings.save().is_ok());
    }

    #[serial]
    #[test]
    fn test_seed_from_env() {
        std::env::set_var("SEED", "42");
        assert_eq!(Settings::seed_from_env(), Some(42));
        std::env::set_var("SEED", "not-a-number");
        assert_eq!(Settings::seed_from_env(), None);
        std::env::remove_var("SEED");
        assert_eq!(Settings::seed_from_env(), None);
    }
}
