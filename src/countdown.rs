//! Countdowns to dates the user cares about (exams, holidays...), and the progress of the school year

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use csscolorparser::Color;
use serde::{Deserialize, Serialize};

use crate::error::{BoxError, ValidationError};
use crate::settings::COUNTDOWNS_KEY;
use crate::traits::Storage;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;


/// A named date to count down to
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    title: String,
    date: DateTime<Utc>,
}

impl Countdown {
    pub fn new(title: String, date: DateTime<Utc>) -> Self {
        Self { title, date }
    }

    pub fn title(&self) -> &str         { &self.title }
    pub fn date(&self) -> DateTime<Utc> { self.date   }

    /// What is left until the date (negative once it has passed)
    pub fn time_left(&self, now: DateTime<Utc>) -> Duration {
        self.date - now
    }

    /// Whole days left, rounded up: anything later today counts as one day
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        let millis = self.time_left(now).num_milliseconds();
        -((-millis).div_euclid(MILLIS_PER_DAY))
    }

    pub fn urgency(&self, now: DateTime<Utc>) -> Urgency {
        let full_days = self.time_left(now).num_milliseconds().div_euclid(MILLIS_PER_DAY);
        Urgency::for_days(full_days)
    }
}


/// How close a countdown is to its end
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Urgency {
    /// Less than a week
    Imminent,
    /// A month at most
    Soon,
    Distant,
}

impl Urgency {
    pub fn for_days(full_days: i64) -> Self {
        if full_days < 7 {
            Urgency::Imminent
        } else if full_days <= 30 {
            Urgency::Soon
        } else {
            Urgency::Distant
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Urgency::Imminent => Color::from_rgba8(0xdd, 0x00, 0x00, 0xff),
            Urgency::Soon => Color::from_rgba8(0xe6, 0x7e, 0x22, 0xff),
            Urgency::Distant => Color::from_rgba8(0x2e, 0xcc, 0x71, 0xff),
        }
    }
}


/// The list of countdowns, always sorted by date, backed by a [`Storage`]
#[derive(Debug)]
pub struct CountdownList<S: Storage> {
    storage: S,
    countdowns: Vec<Countdown>,
}

impl<S: Storage> CountdownList<S> {
    /// Load the list from its storage. Missing or corrupt data gives an empty list
    pub async fn load(storage: S) -> Self {
        let mut countdowns: Vec<Countdown> = match storage.get_item(COUNTDOWNS_KEY).await {
            Err(err) => {
                log::warn!("Unable to read stored countdowns: {}. Starting with no countdown", err);
                Vec::new()
            },
            Ok(None) => Vec::new(),
            Ok(Some(content)) => serde_json::from_str(&content).unwrap_or_else(|err| {
                log::warn!("Invalid stored countdowns: {}. Starting with no countdown", err);
                Vec::new()
            }),
        };
        countdowns.sort_by_key(|countdown| countdown.date);
        Self { storage, countdowns }
    }

    pub fn new(storage: S) -> Self {
        Self { storage, countdowns: Vec::new() }
    }

    pub async fn persist(&self) -> Result<(), BoxError> {
        let content = serde_json::to_string(&self.countdowns)?;
        self.storage.set_item(COUNTDOWNS_KEY, &content).await
    }

    async fn persist_or_warn(&self) {
        if let Err(err) = self.persist().await {
            log::warn!("Unable to save countdowns: {}", err);
        }
    }

    /// The countdowns, soonest first
    pub fn countdowns(&self) -> &[Countdown] {
        &self.countdowns
    }

    /// Add a countdown. Its title must not be empty
    pub async fn add(&mut self, title: &str, date: DateTime<Utc>) -> Result<(), ValidationError> {
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyCountdownTitle);
        }
        self.countdowns.push(Countdown::new(title.to_string(), date));
        self.countdowns.sort_by_key(|countdown| countdown.date);

        self.persist_or_warn().await;
        Ok(())
    }

    /// Delete the countdown at `index` (in date order). Returns `None` if there is no such countdown
    pub async fn delete(&mut self, index: usize) -> Option<Countdown> {
        if index >= self.countdowns.len() {
            log::debug!("No countdown at index {}, nothing to delete", index);
            return None;
        }
        let removed = self.countdowns.remove(index);

        self.persist_or_warn().await;
        Some(removed)
    }

    /// The first countdown that has not ended yet
    pub fn next(&self, now: DateTime<Utc>) -> Option<&Countdown> {
        self.countdowns.iter().find(|countdown| countdown.date > now)
    }
}


/// The span of a school year
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolYear {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for SchoolYear {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2026, 5, 15).unwrap_or_default(),
        }
    }
}

impl SchoolYear {
    /// The elapsed share of the year, between 0 and 1
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        let start = Utc.from_utc_datetime(&self.start.and_time(NaiveTime::default()));
        let end = Utc.from_utc_datetime(&self.end.and_time(NaiveTime::default()));
        let total = (end - start).num_milliseconds();
        if total <= 0 {
            return 1.0;
        }
        let elapsed = (now - start).num_milliseconds();
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Red at the start of the year, amber in the middle, green near the end
    pub fn progress_color(progress: f64) -> Color {
        if progress < 0.3 {
            Color::from_rgba8(0xd3, 0x2f, 0x2f, 0xff)
        } else if progress < 0.6 {
            Color::from_rgba8(0xff, 0xa0, 0x00, 0xff)
        } else {
            Color::from_rgba8(0x4c, 0xaf, 0x50, 0xff)
        }
    }
}
