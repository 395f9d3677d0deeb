// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Progress notifications for the plan and apply phases

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// A single progress notification.
#[derive(Debug, Clone)]
pub enum ProgressUpdate {
    /// Phase announcement with no numeric progress.
    Message(String),
    /// Per-file progress.
    Progress {
        done: usize,
        total: usize,
        message: String,
    },
}

/// Fire-and-forget sender half of the progress channel.
///
/// Sends never block and never fail: a sink without an observer (or whose
/// receiver has been dropped) silently discards every update.
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    tx: Option<UnboundedSender<ProgressUpdate>>,
}

impl ProgressSink {
    /// A sink that discards every update.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Create a connected sink and its receiver.
    pub fn channel() -> (Self, UnboundedReceiver<ProgressUpdate>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Emit a message-only notification.
    pub fn message(&self, message: impl Into<String>) {
        self.send(ProgressUpdate::Message(message.into()));
    }

    /// Emit a numeric progress notification.
    pub fn progress(&self, done: usize, total: usize, message: impl Into<String>) {
        self.send(ProgressUpdate::Progress {
            done,
            total,
            message: message.into(),
        });
    }

    fn send(&self, update: ProgressUpdate) {
        if let Some(tx) = &self.tx {
            // The observer may be gone already; progress is best-effort.
            let _ = tx.send(update);
        }
    }
}
