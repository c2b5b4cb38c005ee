use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use nl_core::prefs::{PrefChange, PrefKey, PrefUpdate, PreferenceStore};
use nl_core::Result;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Ephemeral in-memory preference store.
pub struct MemoryPrefs {
    state: RwLock<PrefUpdate>,
    events: broadcast::Sender<PrefChange>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(PrefUpdate::default()),
            events,
        }
    }
}

impl Default for MemoryPrefs {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPrefs {
    async fn get(&self, keys: &[PrefKey]) -> Result<PrefUpdate> {
        let mut snapshot = self.state.read().await.clone();
        snapshot.retain(keys);
        Ok(snapshot)
    }

    async fn set(&self, update: PrefUpdate) -> Result<()> {
        let changes = self.state.write().await.apply(&update);
        for change in changes {
            // No subscribers is fine; nobody is watching yet.
            let _ = self.events.send(change);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PrefChange> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nl_core::SummaryLevel;

    #[tokio::test]
    async fn test_missing_keys_are_absent_not_errors() {
        let store = MemoryPrefs::new();
        let got = store.get(&PrefKey::ALL).await.unwrap();
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn test_get_returns_only_requested_keys() {
        let store = MemoryPrefs::new();
        store
            .set(PrefUpdate {
                profession: Some("Security Analyst".to_string()),
                summary_level: Some(SummaryLevel::Brief),
                ..Default::default()
            })
            .await
            .unwrap();

        let got = store.get(&[PrefKey::SummaryLevel]).await.unwrap();
        assert_eq!(got.summary_level, Some(SummaryLevel::Brief));
        assert!(got.profession.is_none());
    }

    #[tokio::test]
    async fn test_subscribe_sees_changed_keys_only() {
        let store = MemoryPrefs::new();
        let mut events = store.subscribe();

        store
            .set(PrefUpdate {
                summary_level: Some(SummaryLevel::Medium),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            PrefChange::SummaryLevel(SummaryLevel::Medium)
        );

        // Re-writing the same value must not notify.
        store
            .set(PrefUpdate {
                summary_level: Some(SummaryLevel::Medium),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .set(PrefUpdate {
                setup_complete: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(events.recv().await.unwrap(), PrefChange::SetupComplete(true));
    }
}
