use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::SummaryLevel;
use crate::Result;

/// The fixed set of recognized settings keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefKey {
    Profession,
    InterestIds,
    SummaryLevel,
    UserId,
    SetupComplete,
}

impl PrefKey {
    pub const ALL: [PrefKey; 5] = [
        PrefKey::Profession,
        PrefKey::InterestIds,
        PrefKey::SummaryLevel,
        PrefKey::UserId,
        PrefKey::SetupComplete,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrefKey::Profession => "profession",
            PrefKey::InterestIds => "interestIds",
            PrefKey::SummaryLevel => "summaryLevel",
            PrefKey::UserId => "userId",
            PrefKey::SetupComplete => "setupComplete",
        }
    }
}

/// A partial mapping over the recognized keys. `None` means "absent": on
/// reads, the key was never written (or not requested); on writes, the key
/// is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrefUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_ids: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_level: Option<SummaryLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_complete: Option<bool>,
}

impl PrefUpdate {
    pub fn is_empty(&self) -> bool {
        self.profession.is_none()
            && self.interest_ids.is_none()
            && self.summary_level.is_none()
            && self.user_id.is_none()
            && self.setup_complete.is_none()
    }

    /// Drops every field whose key is not in `keys`.
    pub fn retain(&mut self, keys: &[PrefKey]) {
        if !keys.contains(&PrefKey::Profession) {
            self.profession = None;
        }
        if !keys.contains(&PrefKey::InterestIds) {
            self.interest_ids = None;
        }
        if !keys.contains(&PrefKey::SummaryLevel) {
            self.summary_level = None;
        }
        if !keys.contains(&PrefKey::UserId) {
            self.user_id = None;
        }
        if !keys.contains(&PrefKey::SetupComplete) {
            self.setup_complete = None;
        }
    }

    /// Merges the present fields of `update` into `self`, returning one
    /// change event per key whose stored value actually changed.
    pub fn apply(&mut self, update: &PrefUpdate) -> Vec<PrefChange> {
        let mut changes = Vec::new();
        if let Some(profession) = &update.profession {
            if self.profession.as_ref() != Some(profession) {
                self.profession = Some(profession.clone());
                changes.push(PrefChange::Profession(profession.clone()));
            }
        }
        if let Some(ids) = &update.interest_ids {
            if self.interest_ids.as_ref() != Some(ids) {
                self.interest_ids = Some(ids.clone());
                changes.push(PrefChange::InterestIds(ids.clone()));
            }
        }
        if let Some(level) = update.summary_level {
            if self.summary_level != Some(level) {
                self.summary_level = Some(level);
                changes.push(PrefChange::SummaryLevel(level));
            }
        }
        if let Some(user_id) = &update.user_id {
            if self.user_id.as_ref() != Some(user_id) {
                self.user_id = Some(user_id.clone());
                changes.push(PrefChange::UserId(user_id.clone()));
            }
        }
        if let Some(flag) = update.setup_complete {
            if self.setup_complete != Some(flag) {
                self.setup_complete = Some(flag);
                changes.push(PrefChange::SetupComplete(flag));
            }
        }
        changes
    }
}

/// The new value of a changed key, delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum PrefChange {
    Profession(String),
    InterestIds(Vec<u32>),
    SummaryLevel(SummaryLevel),
    UserId(String),
    SetupComplete(bool),
}

impl PrefChange {
    pub fn key(&self) -> PrefKey {
        match self {
            PrefChange::Profession(_) => PrefKey::Profession,
            PrefChange::InterestIds(_) => PrefKey::InterestIds,
            PrefChange::SummaryLevel(_) => PrefKey::SummaryLevel,
            PrefChange::UserId(_) => PrefKey::UserId,
            PrefChange::SetupComplete(_) => PrefKey::SetupComplete,
        }
    }
}

/// Thin key-value contract over the persisted settings. Persistence itself
/// is backend-specific; components only ever talk to this trait.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Returns the stored values for the requested keys. Missing keys are
    /// simply absent from the result, never an error.
    async fn get(&self, keys: &[PrefKey]) -> Result<PrefUpdate>;

    /// Writes the present fields of the update.
    async fn set(&self, update: PrefUpdate) -> Result<()>;

    /// Change feed carrying the new value for every key that changed.
    fn subscribe(&self) -> broadcast::Receiver<PrefChange>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_reports_only_real_changes() {
        let mut state = PrefUpdate::default();
        let changes = state.apply(&PrefUpdate {
            summary_level: Some(SummaryLevel::Brief),
            user_id: Some("7".to_string()),
            ..Default::default()
        });
        assert_eq!(changes.len(), 2);

        // Writing the same values again is not a change.
        let changes = state.apply(&PrefUpdate {
            summary_level: Some(SummaryLevel::Brief),
            user_id: Some("7".to_string()),
            ..Default::default()
        });
        assert!(changes.is_empty());
    }

    #[test]
    fn test_retain_drops_unrequested_keys() {
        let mut state = PrefUpdate {
            profession: Some("Security Engineer".to_string()),
            summary_level: Some(SummaryLevel::Medium),
            setup_complete: Some(true),
            ..Default::default()
        };
        state.retain(&[PrefKey::SummaryLevel]);
        assert_eq!(state.summary_level, Some(SummaryLevel::Medium));
        assert!(state.profession.is_none());
        assert!(state.setup_complete.is_none());
    }

    #[test]
    fn test_serde_uses_original_key_names() {
        let update = PrefUpdate {
            interest_ids: Some(vec![3, 8]),
            summary_level: Some(SummaryLevel::Medium),
            setup_complete: Some(true),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["interestIds"], serde_json::json!([3, 8]));
        assert_eq!(json["summaryLevel"], serde_json::json!(1));
        assert_eq!(json["setupComplete"], serde_json::json!(true));
    }
}
