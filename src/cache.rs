//! This module provides the local store of calendar occurrences

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use csscolorparser::Color;

use crate::error::{BoxError, ValidationError};
use crate::occurrence::{DayKey, NewOccurrence, Occurrence, OccurrenceId};
use crate::reconcile::{reconcile, DayMap};
use crate::settings::EVENTS_KEY;
use crate::traits::Storage;


/// The occurrences, filed by day, backed by a [`Storage`].
///
/// Every mutation is written back to the storage. Failing to do so is logged, but is not an error: the in-memory state stays the reference.
#[derive(Debug)]
pub struct EventStore<S: Storage> {
    storage: S,
    days: DayMap,
    /// The day the UI currently displays. This is not persisted
    selected_day: Option<DayKey>,
}

impl<S: Storage> EventStore<S> {
    /// Load the store from its storage.
    ///
    /// Missing or corrupt data gives an empty store
    pub async fn load(storage: S) -> Self {
        let days = match storage.get_item(EVENTS_KEY).await {
            Err(err) => {
                log::warn!("Unable to read stored events: {}. Starting with no event", err);
                DayMap::new()
            },
            Ok(None) => {
                log::debug!("No stored events yet");
                DayMap::new()
            },
            Ok(Some(content)) => match serde_json::from_str::<DayMap>(&content) {
                Err(err) => {
                    log::warn!("Invalid stored events: {}. Starting with no event", err);
                    DayMap::new()
                },
                Ok(days) => normalized(days),
            },
        };

        Self { storage, days, selected_day: None }
    }

    /// Create an empty store, without reading the storage
    pub fn new(storage: S) -> Self {
        Self { storage, days: DayMap::new(), selected_day: None }
    }

    /// Write the current state to the storage
    pub async fn persist(&self) -> Result<(), BoxError> {
        let content = serde_json::to_string(&self.days)?;
        self.storage.set_item(EVENTS_KEY, &content).await
    }

    async fn persist_or_warn(&self) {
        if let Err(err) = self.persist().await {
            log::warn!("Unable to save events: {}", err);
        }
    }

    pub fn days(&self) -> &DayMap {
        &self.days
    }

    /// The occurrences of a given day (possibly none)
    pub fn day(&self, day: &DayKey) -> &[Occurrence] {
        self.days.get(day).map(|occ| occ.as_slice()).unwrap_or(&[])
    }

    pub fn selected_day(&self) -> Option<DayKey> {
        self.selected_day
    }

    pub fn select_day(&mut self, day: DayKey) {
        self.selected_day = Some(day);
    }

    /// Add an occurrence created by the user.
    ///
    /// This is rejected (and nothing changes) unless it ends after it starts.
    pub async fn add_user_record(&mut self, candidate: NewOccurrence, now: DateTime<Utc>) -> Result<OccurrenceId, ValidationError> {
        if candidate.end <= candidate.start {
            return Err(ValidationError::EndNotAfterStart { start: candidate.start, end: candidate.end });
        }

        let id = self.unused_user_id(now);
        let occurrence = candidate.into_occurrence(id.clone());
        log::debug!("Adding user occurrence {} on {}", id, occurrence.day_key());
        self.days.entry(occurrence.day_key())
            .or_insert_with(Vec::new)
            .push(occurrence);

        self.persist_or_warn().await;
        Ok(id)
    }

    /// Two records created within the same millisecond would otherwise share an identity
    fn unused_user_id(&self, now: DateTime<Utc>) -> OccurrenceId {
        let mut created_at = now;
        loop {
            let id = OccurrenceId::user_owned(created_at);
            if self.contains(&id) == false {
                return id;
            }
            created_at = created_at + chrono::Duration::milliseconds(1);
        }
    }

    fn contains(&self, id: &OccurrenceId) -> bool {
        self.days.values().flatten().any(|occ| occ.id() == id)
    }

    /// Delete an occurrence. This is a no-op if it does not exist
    pub async fn delete_record(&mut self, day: &DayKey, id: &OccurrenceId) {
        let occurrences = match self.days.get_mut(day) {
            None => {
                log::debug!("No occurrence on {}, nothing to delete", day);
                return;
            },
            Some(occ) => occ,
        };

        let count_before = occurrences.len();
        occurrences.retain(|occ| occ.id() != id);
        if occurrences.len() == count_before {
            log::debug!("Occurrence {} is not on {}, nothing to delete", id, day);
            return;
        }
        if occurrences.is_empty() {
            self.days.remove(day);
        }

        self.persist_or_warn().await;
    }

    /// Replace the external occurrences with the ones of a fresh feed (see [`reconcile`]).
    ///
    /// This persists the result, and selects `today` unless a day is selected already.
    pub async fn apply_feed<I>(&mut self, fresh: I, today: DayKey)
    where
        I: IntoIterator<Item = Occurrence>,
    {
        self.days = reconcile(&self.days, fresh);
        self.persist_or_warn().await;

        if self.selected_day.is_none() {
            self.selected_day = Some(today);
        }
    }

    /// The next `limit` occurrences that start after `now`, soonest first
    pub fn upcoming(&self, now: DateTime<Utc>, limit: usize) -> Vec<&Occurrence> {
        let mut upcoming: Vec<&Occurrence> = self.days.values()
            .flatten()
            .filter(|occ| occ.start() > now)
            .collect();
        upcoming.sort_by_key(|occ| occ.start());
        upcoming.truncate(limit);
        upcoming
    }

    /// The colour every day should be marked with in a calendar grid (the colour of its first occurrence)
    pub fn day_markers(&self) -> BTreeMap<DayKey, Color> {
        self.days.iter()
            .filter_map(|(day, occurrences)| {
                occurrences.first().map(|occ| (*day, occ.category().color()))
            })
            .collect()
    }
}

/// Make sure stored data honours the invariants of the store: every occurrence under the day of its start, and no empty day
fn normalized(days: DayMap) -> DayMap {
    let mut result = DayMap::new();
    for (day, occurrences) in days {
        for occurrence in occurrences {
            if occurrence.day_key() != day {
                log::debug!("Stored occurrence {} was filed under {}, moving it to {}", occurrence.id(), day, occurrence.day_key());
            }
            result.entry(occurrence.day_key())
                .or_insert_with(Vec::new)
                .push(occurrence);
        }
    }
    result
}
