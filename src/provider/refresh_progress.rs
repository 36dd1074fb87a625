//! Utilities to track the progression of a refresh

use std::fmt::{Display, Error, Formatter};

/// An event that happens during a refresh
#[derive(Clone, Debug, PartialEq)]
pub enum RefreshEvent {
    /// Refresh has not started
    NotStarted,
    /// Refresh has just started, the feed is being downloaded
    Started,
    /// The feed has been downloaded
    Fetched{ bytes: usize },
    /// The feed has been merged into the local store
    Merged{ external_occurrences: usize, days: usize },
    /// Refresh is finished
    Finished{ success: bool },
}

impl Display for RefreshEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            RefreshEvent::NotStarted => write!(f, "Not started"),
            RefreshEvent::Started => write!(f, "Refresh has started..."),
            RefreshEvent::Fetched{bytes} => write!(f, "Downloaded {} bytes...", bytes),
            RefreshEvent::Merged{external_occurrences, days} => write!(f, "Merged {} feed events, {} days in the calendar", external_occurrences, days),
            RefreshEvent::Finished{success} => match success {
                true => write!(f, "Refresh successfully finished"),
                false => write!(f, "Refresh finished with errors"),
            }
        }
    }
}

impl Default for RefreshEvent {
    fn default() -> Self {
        Self::NotStarted
    }
}



/// See [`feedback_channel`]
pub type FeedbackSender = tokio::sync::watch::Sender<RefreshEvent>;
/// See [`feedback_channel`]
pub type FeedbackReceiver = tokio::sync::watch::Receiver<RefreshEvent>;

/// Create a feeback channel, that can be used to retrieve the current progress of a refresh
pub fn feedback_channel() -> (FeedbackSender, FeedbackReceiver) {
    tokio::sync::watch::channel(RefreshEvent::default())
}




/// A structure that tracks the progression and the errors that happen during a refresh
pub struct RefreshProgress {
    n_errors: u32,
    feedback_channel: Option<FeedbackSender>
}
impl RefreshProgress {
    pub fn new() -> Self {
        Self { n_errors: 0, feedback_channel: None }
    }
    pub fn new_with_feedback_channel(channel: FeedbackSender) -> Self {
        Self { n_errors: 0, feedback_channel: Some(channel) }
    }


    pub fn is_success(&self) -> bool {
        self.n_errors == 0
    }

    /// Log a warning, that makes the refresh unsuccessful
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
    pub fn feedback(&mut self, event: RefreshEvent) {
        if let Some(sender) = &self.feedback_channel {
            // Nobody listening is fine
            let _ = sender.send(event);
        }
    }
}

impl Default for RefreshProgress {
    fn default() -> Self {
        Self::new()
    }
}
