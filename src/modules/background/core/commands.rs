// Commands other parts of the extension send to the background process.
//
// Wire shape is serde's externally tagged layout with SCREAMING_SNAKE_CASE tags:
// unit commands are bare strings ("PING"), commands with data are single-key objects
// ({"TRACK_PRODUCT":{"product_id":"sku-1"}}).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    Ping,
    GetSession,
    TrackProduct { product_id: String },
    UntrackProduct { product_id: String },
    ListTrackedProducts,
    CheckForUpdates,
}

impl Command {
    /// Wire tag, used as a log field.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping => "PING",
            Command::GetSession => "GET_SESSION",
            Command::TrackProduct { .. } => "TRACK_PRODUCT",
            Command::UntrackProduct { .. } => "UNTRACK_PRODUCT",
            Command::ListTrackedProducts => "LIST_TRACKED_PRODUCTS",
            Command::CheckForUpdates => "CHECK_FOR_UPDATES",
        }
    }
}
