//! This modules ties a feed source and the local store together
//!
//! It is responsible for refreshing the local store from the feed

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::cache::EventStore;
use crate::occurrence::Occurrence;
use crate::traits::{FeedSource, Storage};

pub mod refresh_progress;
use refresh_progress::RefreshProgress;
use refresh_progress::{FeedbackSender, RefreshEvent};


/// A data source that combines a feed and a local [`EventStore`], and is able to refresh the latter from the former.
///
/// The store is shared: the UI may edit it while a refresh is in flight.
/// The downloaded feed is merged into the store as it is when the download completes, so that such edits are never lost.
pub struct Provider<F, S>
where
    F: FeedSource,
    S: Storage,
{
    /// The remote feed (usually a [`Client`](crate::client::Client))
    remote: F,
    /// The local store
    local: Arc<Mutex<EventStore<S>>>,
}

impl<F, S> Provider<F, S>
where
    F: FeedSource,
    S: Storage,
{
    pub fn new(remote: F, local: EventStore<S>) -> Self {
        Self { remote, local: Arc::new(Mutex::new(local)) }
    }

    /// Create a provider around a store that is already shared with other parts of the app
    pub fn new_shared(remote: F, local: Arc<Mutex<EventStore<S>>>) -> Self {
        Self { remote, local }
    }

    /// Returns a handle to the local store
    pub fn local(&self) -> Arc<Mutex<EventStore<S>>> {
        Arc::clone(&self.local)
    }

    /// Returns the feed source
    pub fn remote(&self) -> &F { &self.remote }

    /// Refresh the local store from the feed, and provide feedback to the user about the progress.
    ///
    /// See [`Self::refresh`]
    pub async fn refresh_with_feedback(&self, now: DateTime<Utc>, feedback_sender: FeedbackSender) -> bool {
        let mut progress = RefreshProgress::new_with_feedback_channel(feedback_sender);
        self.run_refresh(now, &mut progress).await
    }

    /// Refresh the local store from the feed, without giving any feedback.
    ///
    /// Every occurrence that came from a previous feed is replaced, occurrences created by the user are kept.
    ///
    /// It returns whether the refresh was successful (details about errors are logged using the `log::*` macros).
    /// In case the feed cannot be downloaded or parsed, the local store is left untouched. Simply run this function again later.
    pub async fn refresh(&self, now: DateTime<Utc>) -> bool {
        let mut progress = RefreshProgress::new();
        self.run_refresh(now, &mut progress).await
    }

    async fn run_refresh(&self, now: DateTime<Utc>, progress: &mut RefreshProgress) -> bool {
        progress.info("Starting a refresh.");
        progress.feedback(RefreshEvent::Started);

        if let Some(fresh) = self.fetch_and_parse(progress).await {
            let n_fresh = fresh.len();
            let mut local = self.local.lock().await;
            local.apply_feed(fresh, now.date_naive()).await;

            progress.info(&format!("Merged {} feed events", n_fresh));
            progress.feedback(RefreshEvent::Merged{
                external_occurrences: n_fresh,
                days: local.days().len(),
            });
        }

        progress.feedback(RefreshEvent::Finished{ success: progress.is_success() });
        progress.is_success()
    }

    /// Returns `None` in case nothing should be merged
    async fn fetch_and_parse(&self, progress: &mut RefreshProgress) -> Option<Vec<Occurrence>> {
        let text = match self.remote.fetch().await {
            Err(err) => {
                progress.warn(&format!("Unable to download the feed: {}. Keeping the current events", err));
                return None;
            },
            Ok(text) => text,
        };
        progress.feedback(RefreshEvent::Fetched{ bytes: text.len() });

        let mut occurrences = crate::ical::parse(&text);
        let fresh: Vec<Occurrence> = occurrences.by_ref().collect();
        if occurrences.has_failed() {
            progress.warn("The feed is not a valid calendar. Keeping the current events");
            return None;
        }
        progress.debug(&format!("Parsed {} events from the feed", fresh.len()));
        Some(fresh)
    }
}
