use crate::profile::UserSummary;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;

/// Where the signed-in user stands with someone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    Pending,
    Sent,
    Received,
    Accepted,
    #[default]
    #[serde(other)]
    None,
}

impl FriendStatus {
    pub fn action_label(&self) -> &'static str {
        match self {
            FriendStatus::None => "Add to close circle",
            FriendStatus::Pending | FriendStatus::Sent => "Request sent (cancel)",
            FriendStatus::Received => "Wants to join your circle",
            FriendStatus::Accepted => "In your close circle",
        }
    }

    /// What pressing the button does from this status.
    pub fn action(&self) -> Option<FriendAction> {
        match self {
            FriendStatus::None => Some(FriendAction::Send),
            FriendStatus::Pending | FriendStatus::Sent => Some(FriendAction::Cancel),
            FriendStatus::Received | FriendStatus::Accepted => None,
        }
    }

    pub fn after(&self, action: FriendAction) -> FriendStatus {
        match action {
            FriendAction::Send => FriendStatus::Pending,
            FriendAction::Cancel => FriendStatus::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendAction {
    Send,
    Cancel,
}

#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: FriendStatus,
}

/// `{ success, message }` envelope used by the mutating friend endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub from: Option<UserSummary>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl FriendRequest {
    pub fn sender_name(&self) -> String {
        self.from
            .as_ref()
            .map(UserSummary::display_name)
            .unwrap_or_else(|| "Someone".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct PendingResponse {
    #[serde(default)]
    pub data: Vec<FriendRequest>,
}

/// Pending requests with a guard against double-submitting one.
#[derive(Debug, Default)]
pub struct NotificationsState {
    pub requests: Vec<FriendRequest>,
    pub processing: HashSet<String>,
    pub selected: usize,
}

impl NotificationsState {
    pub fn set_requests(&mut self, requests: Vec<FriendRequest>) {
        self.requests = requests;
        self.selected = 0;
    }

    pub fn pending_count(&self) -> usize {
        self.requests.len()
    }

    /// False when the request is already being accepted or rejected.
    pub fn begin(&mut self, id: &str) -> bool {
        self.processing.insert(id.to_string())
    }

    pub fn is_processing(&self, id: &str) -> bool {
        self.processing.contains(id)
    }

    pub fn finish(&mut self, id: &str, handled: bool) {
        self.processing.remove(id);
        if handled {
            self.requests.retain(|r| r.id != id);
            if self.selected >= self.requests.len() {
                self.selected = self.requests.len().saturating_sub(1);
            }
        }
    }

    pub fn selected_request(&self) -> Option<&FriendRequest> {
        self.requests.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.requests.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}
