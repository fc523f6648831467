use std::collections::HashMap;
use std::path::PathBuf;
use std::{env, fs, io};

/// Key-value persistence boundary for scores and settings. Values are the
/// serialized documents themselves; callers own the (de)serialization.
pub trait ScoreStore {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&mut self, key: &str) -> io::Result<()>;
}

/// Application data directory: `$XDG_DATA_HOME/pairvault`, falling back to
/// `~/.local/share/pairvault`.
pub fn default_data_dir() -> PathBuf {
    let base = env::var_os("XDG_DATA_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .unwrap_or_else(|| {
            let home = env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
            home.join(".local").join("share")
        });
    base.join("pairvault")
}

/// One `<key>.json` file per key. Unreadable entries read as absent.
#[derive(Debug)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn new_default() -> Self {
        Self::new(default_data_dir())
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}

impl ScoreStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }

    fn put(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::write(self.key_path(key), value)
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.key_path(key)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// HashMap-backed store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        env::temp_dir().join(format!("pairvault-store-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = scratch_dir();
        let mut store = FileStore::new(dir.clone());

        assert_eq!(store.get("best_easy"), None);
        store.put("best_easy", "{\"moves\":4}").unwrap();
        assert_eq!(store.get("best_easy").as_deref(), Some("{\"moves\":4}"));

        store.remove("best_easy").unwrap();
        assert_eq!(store.get("best_easy"), None);
        // removing a missing key is not an error
        store.remove("best_easy").unwrap();

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        store.put("leaderboard_hard", "[]").unwrap();
        assert_eq!(store.get("leaderboard_hard").as_deref(), Some("[]"));
        store.remove("leaderboard_hard").unwrap();
        assert_eq!(store.get("leaderboard_hard"), None);
    }
}
