use crate::api::CompletionLookup;
use crate::codeforces::model::ProblemKey;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::watch;

type Result<T> = std::result::Result<T, StorageError>;

/// Key holding the selected handle as a plain string.
pub const HANDLE_KEY: &str = "cf_handle";
/// Key holding the completion flags as a JSON object.
pub const COMPLETED_PROBLEMS_KEY: &str = "completed_problems";

/// Problem key string (`"1-A"`) to completed flag.
pub type CompletionMap = BTreeMap<String, bool>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access the state file")]
    IoError(#[from] std::io::Error),
    #[error("failed to serialize or deserialize stored state")]
    SerializeError(#[from] serde_json::Error),
    #[error("stored state lock was poisoned")]
    PoisonedError,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| StorageError::PoisonedError)
}

/// String-keyed persistent storage shared by the preference stores.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}

/// Stores every entry in one JSON object on disk, rewritten on each mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                match serde_json::from_str(&content) {
                    Ok(entries) => entries,
                    Err(e) => {
                        tracing::warn!(
                            "state file {} is unreadable, starting empty: {}",
                            path.display(),
                            e
                        );
                        BTreeMap::new()
                    }
                }
            }
        } else {
            BTreeMap::new()
        };
        tracing::debug!("opened state file {}", path.display());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;

        // The live file is only ever replaced whole.
        let staging = self.staging_path();
        std::fs::write(&staging, content)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = lock(&self.entries)?;
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value.to_string());
        self.write(&updated)?;
        *entries = updated;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = lock(&self.entries)?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut updated = entries.clone();
        updated.remove(key);
        self.write(&updated)?;
        *entries = updated;
        Ok(())
    }
}

/// Process-wide completed-problem flags, persisted under [`COMPLETED_PROBLEMS_KEY`].
///
/// The mapping is read from the backing store on first access. Every mutation is
/// written back before it becomes visible, then published to subscribers.
pub struct CompletionStore<S: KeyValueStore> {
    store: S,
    state: Mutex<Option<CompletionMap>>,
    sender: watch::Sender<CompletionMap>,
}

impl<S: KeyValueStore> CompletionStore<S> {
    pub fn new(store: S) -> Self {
        let (sender, _) = watch::channel(CompletionMap::new());
        Self {
            store,
            state: Mutex::new(None),
            sender,
        }
    }

    fn read(&self) -> Result<CompletionMap> {
        let Some(raw) = self.store.get(COMPLETED_PROBLEMS_KEY)? else {
            return Ok(CompletionMap::new());
        };
        match serde_json::from_str::<CompletionMap>(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                tracing::warn!(
                    "stored completion flags are unreadable, starting empty: {}",
                    e
                );
                Ok(CompletionMap::new())
            }
        }
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut Option<CompletionMap>) -> Result<T>,
    ) -> Result<T> {
        let mut state = lock(&self.state)?;
        if state.is_none() {
            let map = self.read()?;
            self.sender.send_replace(map.clone());
            *state = Some(map);
        }
        f(&mut *state)
    }

    pub fn get(&self, key: &ProblemKey) -> Result<bool> {
        self.with_state(|state| {
            Ok(state
                .as_ref()
                .and_then(|map| map.get(&key.to_string()).copied())
                .unwrap_or(false))
        })
    }

    pub fn set(&self, key: &ProblemKey, completed: bool) -> Result<()> {
        self.with_state(|state| {
            let mut map = state.clone().unwrap_or_default();
            map.insert(key.to_string(), completed);
            self.store
                .set(COMPLETED_PROBLEMS_KEY, &serde_json::to_string(&map)?)?;
            *state = Some(map.clone());
            self.sender.send_replace(map);
            Ok(())
        })
    }

    /// Flips the flag and returns its new value.
    pub fn toggle(&self, key: &ProblemKey) -> Result<bool> {
        self.with_state(|state| {
            let mut map = state.clone().unwrap_or_default();
            let completed = !map.get(&key.to_string()).copied().unwrap_or(false);
            map.insert(key.to_string(), completed);
            self.store
                .set(COMPLETED_PROBLEMS_KEY, &serde_json::to_string(&map)?)?;
            *state = Some(map.clone());
            self.sender.send_replace(map);
            Ok(completed)
        })
    }

    pub fn snapshot(&self) -> Result<CompletionMap> {
        self.with_state(|state| Ok(state.clone().unwrap_or_default()))
    }

    /// Keys currently flagged as completed, in key order of the persisted map.
    pub fn completed(&self) -> Result<Vec<ProblemKey>> {
        let snapshot = self.snapshot()?;
        Ok(snapshot
            .into_iter()
            .filter(|(_, completed)| *completed)
            .filter_map(|(key, _)| match key.parse::<ProblemKey>() {
                Ok(key) => Some(key),
                Err(e) => {
                    tracing::warn!("{}", e);
                    None
                }
            })
            .collect())
    }

    /// Receives the whole mapping after every mutation.
    pub fn subscribe(&self) -> Result<watch::Receiver<CompletionMap>> {
        self.with_state(|_| Ok(self.sender.subscribe()))
    }
}

impl<S: KeyValueStore> CompletionLookup for CompletionStore<S> {
    fn is_completed(&self, key: &ProblemKey) -> bool {
        match self.get(key) {
            Ok(completed) => completed,
            Err(e) => {
                tracing::warn!("failed to read completion flag of {}: {}", key, e);
                false
            }
        }
    }
}

/// The persisted "currently selected handle".
pub struct PreferenceStore<S: KeyValueStore> {
    store: S,
    sender: watch::Sender<Option<String>>,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(store: S) -> Result<Self> {
        let current = store
            .get(HANDLE_KEY)?
            .filter(|handle| !handle.trim().is_empty());
        let (sender, _) = watch::channel(current);
        Ok(Self { store, sender })
    }

    pub fn selected_handle(&self) -> Option<String> {
        self.sender.borrow().clone()
    }

    /// A blank handle clears the selection.
    pub fn set_selected_handle(&self, handle: &str) -> Result<()> {
        let handle = handle.trim();
        if handle.is_empty() {
            return self.clear_selected_handle();
        }
        self.store.set(HANDLE_KEY, handle)?;
        self.sender.send_replace(Some(handle.to_string()));
        Ok(())
    }

    pub fn clear_selected_handle(&self) -> Result<()> {
        self.store.remove(HANDLE_KEY)?;
        self.sender.send_replace(None);
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.sender.subscribe()
    }
}
