//! Support for configuration options

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::countdown::SchoolYear;
use crate::error::BoxError;
use crate::reminder::default_poll_period;

/// Storage key of the day-keyed occurrences
pub const EVENTS_KEY: &str = "events";
/// Storage key of the to-do list
pub const TASKS_KEY: &str = "todos";
/// Storage key of the countdowns
pub const COUNTDOWNS_KEY: &str = "@countdowns";

/// Environment variables that override the feed credentials of the settings file
pub const FEED_USER_VAR: &str = "PLANNER_FEED_USER";
pub const FEED_PASSWORD_VAR: &str = "PLANNER_FEED_PASSWORD";

/// Where documents are stored, unless configured otherwise
pub static DEFAULT_STORAGE_FOLDER: Lazy<PathBuf> = Lazy::new(|| {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("student-planner")
});

const DEFAULT_FEED_URL: &str = "https://proxy-ixes.onrender.com/edt";
const DEFAULT_COOLDOWN_MINUTES: i64 = 2 * 60;


#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub feed_url: Url,
    pub feed_username: Option<String>,
    pub feed_password: Option<String>,
    pub storage_folder: PathBuf,
    /// How often reminders are evaluated
    pub poll_period_secs: u64,
    /// Minimum delay between two notifications of the same task
    pub cooldown_minutes: i64,
    pub school_year: SchoolYear,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feed_url: Url::parse(DEFAULT_FEED_URL).unwrap(/* this is a valid constant URL */),
            feed_username: None,
            feed_password: None,
            storage_folder: DEFAULT_STORAGE_FOLDER.clone(),
            poll_period_secs: default_poll_period().as_secs(),
            cooldown_minutes: DEFAULT_COOLDOWN_MINUTES,
            school_year: SchoolYear::default(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. Missing fields take their default values
    pub fn from_file(path: &Path) -> Result<Self, BoxError> {
        let file = match std::fs::File::open(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => file,
        };
        let settings: Self = serde_json::from_reader(file)?;
        Ok(settings.sanitized())
    }

    /// Replace values that cannot be used with their defaults
    pub fn sanitized(mut self) -> Self {
        if self.poll_period_secs == 0 {
            log::warn!("A poll period of 0 s is not possible. Using {:?} instead", default_poll_period());
            self.poll_period_secs = default_poll_period().as_secs();
        }
        if self.cooldown_minutes < 0 {
            log::warn!("A negative cooldown ({} min) is not possible. Using {} min instead", self.cooldown_minutes, DEFAULT_COOLDOWN_MINUTES);
            self.cooldown_minutes = DEFAULT_COOLDOWN_MINUTES;
        }
        self
    }

    /// Read settings from a JSON file, or use the defaults if that is not possible.
    ///
    /// Credentials from the environment take precedence over the file.
    pub fn load(path: Option<&Path>) -> Self {
        let mut settings = match path.map(Self::from_file) {
            None => Self::default(),
            Some(Ok(settings)) => settings,
            Some(Err(err)) => {
                log::warn!("Invalid settings file: {}. Using default settings", err);
                Self::default()
            },
        };

        if let Ok(user) = std::env::var(FEED_USER_VAR) {
            settings.feed_username = Some(user);
        }
        if let Ok(password) = std::env::var(FEED_PASSWORD_VAR) {
            settings.feed_password = Some(password);
        }
        settings
    }

    pub fn poll_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_period_secs)
    }

    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cooldown_minutes)
    }
}
