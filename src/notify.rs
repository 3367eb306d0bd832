//! Transient User Notices
//!
//! Every failure and most successful actions end up here. Notices expire
//! after a fixed lifetime; pushing a notice identical to one that is still
//! visible is a no-op.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Default lifetime of a notice
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NoticeKind::Success => "success",
            NoticeKind::Info => "info",
            NoticeKind::Warning => "warning",
            NoticeKind::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    expires_at: Instant,
}

impl Notice {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Queue of visible notices
#[derive(Debug)]
pub struct NotificationCenter {
    notices: Vec<Notice>,
    next_id: u64,
    ttl: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(NOTICE_TTL)
    }
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            notices: Vec::new(),
            next_id: 1,
            ttl,
        }
    }

    /// Show a notice; returns its id, or `None` if the same notice is already visible
    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>, now: Instant) -> Option<u64> {
        let message = message.into();
        self.prune(now);

        if self
            .notices
            .iter()
            .any(|n| n.kind == kind && n.message == message)
        {
            return None;
        }

        match kind {
            NoticeKind::Error => tracing::error!(%message, "notice"),
            NoticeKind::Warning => tracing::warn!(%message, "notice"),
            _ => tracing::info!(%message, "notice"),
        }

        let id = self.next_id;
        self.next_id += 1;
        self.notices.push(Notice {
            id,
            kind,
            message,
            expires_at: now + self.ttl,
        });
        Some(id)
    }

    pub fn success(&mut self, message: impl Into<String>) -> Option<u64> {
        self.push(NoticeKind::Success, message, Instant::now())
    }

    pub fn info(&mut self, message: impl Into<String>) -> Option<u64> {
        self.push(NoticeKind::Info, message, Instant::now())
    }

    pub fn warning(&mut self, message: impl Into<String>) -> Option<u64> {
        self.push(NoticeKind::Warning, message, Instant::now())
    }

    pub fn error(&mut self, message: impl Into<String>) -> Option<u64> {
        self.push(NoticeKind::Error, message, Instant::now())
    }

    /// Close a notice before it expires
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Notices still visible at `now`
    pub fn active(&mut self, now: Instant) -> &[Notice] {
        self.prune(now);
        &self.notices
    }

    /// Remove and return every visible notice
    pub fn drain(&mut self, now: Instant) -> Vec<Notice> {
        self.prune(now);
        std::mem::take(&mut self.notices)
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    fn prune(&mut self, now: Instant) {
        self.notices.retain(|n| !n.is_expired(now));
    }
}
