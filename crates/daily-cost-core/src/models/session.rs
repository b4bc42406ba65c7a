// ABOUTME: WeChat QR login session record and its status state machine
// ABOUTME: Sessions live only in the cache; `expired` is derived and never stored
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use super::{TokenPair, UserInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Login handshake status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// QR code issued, nobody has scanned it yet
    Pending,
    /// A device scanned the QR code
    Scanned,
    /// The user authorized; the code exchange is in flight
    Confirmed,
    /// Tokens were issued
    Success,
    /// The provider rejected the login or the exchange failed
    Failed,
    /// The user or client abandoned the login
    Cancelled,
    /// The session record is gone or past its deadline
    Expired,
}

impl SessionStatus {
    /// Whether `next` is a legal successor of `self`
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Pending,
                Self::Scanned | Self::Confirmed | Self::Cancelled | Self::Failed
            ) | (Self::Scanned, Self::Confirmed | Self::Cancelled | Self::Failed)
                | (Self::Confirmed, Self::Success | Self::Failed | Self::Cancelled)
        )
    }

    /// Whether no further transition is possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success | Self::Failed | Self::Cancelled | Self::Expired
        )
    }

    /// Message shown to a polling client
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Pending => "Waiting for scan",
            Self::Scanned => "Scanned, waiting for confirmation",
            Self::Confirmed => "Confirmed, logging in",
            Self::Success => "Login successful",
            Self::Failed => "Login failed",
            Self::Cancelled => "Login cancelled",
            Self::Expired => "QR code expired",
        }
    }

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scanned => "scanned",
            Self::Confirmed => "confirmed",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cached login session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSession {
    /// Identifier polled by the client
    pub session_id: String,
    /// OAuth `state` embedded in the QR URL
    pub state: String,
    /// Current status
    pub status: SessionStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Deadline after which the session reads as expired
    pub expires_at: DateTime<Utc>,
    /// Logged in user, set on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
    /// Issued tokens, set on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenPair>,
    /// Failure reason, set on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoginSession {
    /// Whether the session deadline has passed at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Status as observed at `now`
    #[must_use]
    pub fn effective_status(&self, now: DateTime<Utc>) -> SessionStatus {
        if self.is_expired_at(now) {
            SessionStatus::Expired
        } else {
            self.status
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(status: SessionStatus, expires_in_secs: i64) -> LoginSession {
        let now = Utc::now();
        LoginSession {
            session_id: "s-1".to_owned(),
            state: "st-1".to_owned(),
            status,
            created_at: now,
            expires_at: now + Duration::seconds(expires_in_secs),
            user_info: None,
            token: None,
            error: None,
        }
    }

    #[test]
    fn test_forward_transitions_allowed() {
        use SessionStatus::{Cancelled, Confirmed, Failed, Pending, Scanned, Success};
        assert!(Pending.can_transition_to(Scanned));
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Scanned.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Success));
        assert!(Confirmed.can_transition_to(Failed));
        assert!(Scanned.can_transition_to(Cancelled));
    }

    #[test]
    fn test_backward_and_terminal_transitions_rejected() {
        use SessionStatus::{Cancelled, Confirmed, Expired, Failed, Pending, Scanned, Success};
        assert!(!Scanned.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Success));
        assert!(!Success.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Confirmed));
        assert!(!Cancelled.can_transition_to(Scanned));
        assert!(!Pending.can_transition_to(Expired));
    }

    #[test]
    fn test_effective_status_reports_expiry() {
        let live = session(SessionStatus::Pending, 60);
        assert_eq!(live.effective_status(Utc::now()), SessionStatus::Pending);

        let stale = session(SessionStatus::Scanned, -1);
        assert_eq!(stale.effective_status(Utc::now()), SessionStatus::Expired);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&SessionStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
        assert_eq!(SessionStatus::Confirmed.to_string(), "confirmed");
    }
}
