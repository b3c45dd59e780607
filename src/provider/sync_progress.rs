//! Utilities to track what happens during sync operations

use std::fmt::{Display, Error, Formatter};

/// An event that happens during a sync
#[derive(Clone, Debug, PartialEq)]
pub enum SyncEvent {
    /// Nothing has happened yet
    NotStarted,
    /// The local items have changed. They can be read again from the cache
    ItemsUpdated{ count: usize },
    /// A single change has been applied to the remote end
    Pushed{ details: String },
    /// The whole list has been reconciled with the remote end
    Reconciled{ count: usize },
    /// A remote or local operation has failed. Local and remote contents may now differ
    Failed{ error: String },
}

impl Display for SyncEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            SyncEvent::NotStarted => write!(f, "Not started"),
            SyncEvent::ItemsUpdated{count} => write!(f, "{} items", count),
            SyncEvent::Pushed{details} => write!(f, "Pushed {}", details),
            SyncEvent::Reconciled{count} => write!(f, "Reconciled {} items", count),
            SyncEvent::Failed{error} => write!(f, "Sync failed: {}", error),
        }
    }
}

impl Default for SyncEvent {
    fn default() -> Self {
        Self::NotStarted
    }
}



/// See [`feedback_channel`]
pub type FeedbackSender = tokio::sync::watch::Sender<SyncEvent>;
/// See [`feedback_channel`]
pub type FeedbackReceiver = tokio::sync::watch::Receiver<SyncEvent>;

/// Create a feeback channel, that can be used to observe what a [`Provider`](crate::Provider) is doing
pub fn feedback_channel() -> (FeedbackSender, FeedbackReceiver) {
    tokio::sync::watch::channel(SyncEvent::default())
}




/// A structure that logs what happens during sync operations, counts the errors, and forwards events to a listener (if any)
pub struct SyncProgress {
    n_errors: u32,
    feedback_channel: Option<FeedbackSender>
}
impl SyncProgress {
    pub fn new() -> Self {
        Self { n_errors: 0, feedback_channel: None }
    }

    pub fn set_feedback_channel(&mut self, channel: FeedbackSender) {
        self.feedback_channel = Some(channel);
    }

    /// How many errors have been reported so far
    pub fn n_errors(&self) -> u32 {
        self.n_errors
    }

    /// Log an error
    pub fn error(&mut self, text: &str) {
        log::error!("{}", text);
        self.n_errors += 1;
    }
    /// Log a warning
    pub fn warn(&mut self, text: &str) {
        log::warn!("{}", text);
        self.n_errors += 1;
    }
    /// Log an info
    pub fn info(&mut self, text: &str) {
        log::info!("{}", text);
    }
    /// Log a debug message
    pub fn debug(&mut self, text: &str) {
        log::debug!("{}", text);
    }
    /// Send an event as a feedback to the listener (if any).
    pub fn feedback(&mut self, event: SyncEvent) {
        if let Some(sender) = &self.feedback_channel {
            // Nobody listening anymore is not an error
            let _ = sender.send(event);
        }
    }
}

impl Default for SyncProgress {
    fn default() -> Self {
        Self::new()
    }
}
