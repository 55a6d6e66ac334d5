//! Closed data model shared by every component of the processing engine.
//!
//! Remote responses are decoded into these types at the client boundary so
//! that the decision ladder and classifier never operate on untyped JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a target identifier was supplied on the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Id,
    Handle,
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetFormat::Id => write!(f, "id"),
            TargetFormat::Handle => write!(f, "handle"),
        }
    }
}

/// A single entry read from the targets file. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub value: String,
    pub format: TargetFormat,
}

impl Target {
    pub fn new(value: impl Into<String>, format: TargetFormat) -> Self {
        Self { value: value.into(), format }
    }
}

/// Remote account availability, independent of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Active,
    Unavailable,
    Suspended,
    Deactivated,
    NotFound,
}

impl Availability {
    /// Availability states that make a target permanently unprocessable.
    pub fn is_permanent(self) -> bool {
        matches!(self, Availability::NotFound | Availability::Deactivated | Availability::Suspended)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Availability::Active => "active",
            Availability::Unavailable => "unavailable",
            Availability::Suspended => "suspended",
            Availability::Deactivated => "deactivated",
            Availability::NotFound => "not_found",
        };
        write!(f, "{}", s)
    }
}

/// Stable attributes of a remote account, independent of who is looking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub handle: String,
    pub display_name: String,
    pub availability: Availability,
}

/// Pairwise state between the session owner and a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub following: bool,
    pub followed_by: bool,
    pub blocking: bool,
    pub blocked_by: bool,
    pub protected: bool,
}

impl Default for Relationship {
    fn default() -> Self {
        Self {
            following: false,
            followed_by: false,
            blocking: false,
            blocked_by: false,
            protected: false,
        }
    }
}

/// The merged view the decision ladder actually reasons over.
#[derive(Debug, Clone)]
pub struct FullUser {
    pub profile: Profile,
    pub relationship: Relationship,
}

/// Closed set of failure classifications produced by the response classifier
/// and the engine's relationship-level decisions. Never reorder existing
/// variants' meaning; only ever append new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RateLimit,
    AuthRequired,
    PermissionDenied,
    AccountRestricted,
    AntiBot,
    IpBlocked,
    HeaderIssue,
    UnknownForbidden,
    ServerError,
    Timeout,
    NotFound,
    RelationshipConflict,
    FollowConflict,
    AlreadyBlocked,
    None,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::AuthRequired => "auth_required",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::AccountRestricted => "account_restricted",
            ErrorKind::AntiBot => "anti_bot",
            ErrorKind::IpBlocked => "ip_blocked",
            ErrorKind::HeaderIssue => "header_issue",
            ErrorKind::UnknownForbidden => "unknown_forbidden",
            ErrorKind::ServerError => "server_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::NotFound => "not_found",
            ErrorKind::RelationshipConflict => "relationship_conflict",
            ErrorKind::FollowConflict => "follow_conflict",
            ErrorKind::AlreadyBlocked => "already_blocked",
            ErrorKind::None => "none",
        };
        write!(f, "{}", s)
    }
}

/// Classifier severity: how much the failure should worry the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Priority {
    Correctable = 1,
    PolicyChange = 2,
    Severe = 3,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// Terminal status of a history row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Blocked,
    Failed,
}

impl fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryStatus::Blocked => write!(f, "blocked"),
            HistoryStatus::Failed => write!(f, "failed"),
        }
    }
}

/// In-memory record of one network attempt, used only for the retry
/// policy's rolling success-rate window. Never persisted.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub kind: ErrorKind,
    pub success: bool,
}

/// Session counters, persisted via `process_log`.
#[derive(Debug, Clone, Default)]
pub struct SessionCounters {
    pub processed: usize,
    pub blocked: usize,
    pub skipped: usize,
    pub errored: usize,
}
