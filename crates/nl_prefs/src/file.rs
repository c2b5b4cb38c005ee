use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use nl_core::prefs::{PrefChange, PrefKey, PrefUpdate, PreferenceStore};
use nl_core::Result;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Preference store persisted as a single JSON object on disk, write-through
/// on every set. The on-disk keys match the original settings names
/// (`profession`, `interestIds`, `summaryLevel`, `userId`, `setupComplete`).
pub struct JsonFilePrefs {
    path: PathBuf,
    state: RwLock<PrefUpdate>,
    events: broadcast::Sender<PrefChange>,
}

impl JsonFilePrefs {
    /// Opens the store, loading any existing file. A missing file starts
    /// empty; it is created on the first write.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no preferences file at {}, starting empty", path.display());
                PrefUpdate::default()
            }
            Err(e) => return Err(e.into()),
        };
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            path,
            state: RwLock::new(state),
            events,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, state: &PrefUpdate) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let contents = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for JsonFilePrefs {
    async fn get(&self, keys: &[PrefKey]) -> Result<PrefUpdate> {
        let mut snapshot = self.state.read().await.clone();
        snapshot.retain(keys);
        Ok(snapshot)
    }

    async fn set(&self, update: PrefUpdate) -> Result<()> {
        let mut state = self.state.write().await;
        let changes = state.apply(&update);
        if !changes.is_empty() {
            self.persist(&state).await?;
        }
        drop(state);
        for change in changes {
            let _ = self.events.send(change);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PrefChange> {
        self.events.subscribe()
    }
}
