use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Messages delivered from the background side (context menu, popup action)
/// to the active page's panel controller. The wire shape matches the original
/// messaging contract: `{"action": "explainText", "text": …}` and
/// `{"action": "openChat"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "text", rename_all = "camelCase")]
pub enum PanelCommand {
    /// Explain the selected text fragment.
    ExplainText(String),
    /// Open the panel in open-ended chat mode.
    OpenChat,
}

const COMMAND_CHANNEL_CAPACITY: usize = 8;

/// Channel pair connecting the command producer to the panel controller.
pub fn channel() -> (mpsc::Sender<PanelCommand>, mpsc::Receiver<PanelCommand>) {
    mpsc::channel(COMMAND_CHANNEL_CAPACITY)
}
