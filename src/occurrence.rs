//! Calendar occurrences (a lecture, a sports session, a party...)

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use chrono::{DateTime, NaiveDate, Utc};
use csscolorparser::Color;

/// The calendar day an occurrence is filed under (the UTC date of its start). Serialized as `YYYY-MM-DD`.
pub type DayKey = NaiveDate;

const FEED_PREFIX: &str = "feed-";
const USER_PREFIX: &str = "user-";

/// Whether an occurrence comes from the external feed or has been created by the user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provenance {
    External,
    UserOwned,
}


/// The identity of an [`Occurrence`].
///
/// Its provenance is encoded in the identity itself, and is not stored anywhere else.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccurrenceId {
    content: String,
}

impl OccurrenceId {
    /// Build the identity of an occurrence found in a feed.
    ///
    /// `position` is the index of the event in the feed. This is only stable for a given download of the feed
    pub fn external(uid: Option<&str>, position: usize) -> Self {
        let uid = uid.filter(|uid| uid.is_empty() == false).unwrap_or("event");
        Self { content: format!("{}{}-{}", FEED_PREFIX, uid, position) }
    }

    /// Build the identity of an occurrence created by the user at `created_at`
    pub fn user_owned(created_at: DateTime<Utc>) -> Self {
        Self { content: format!("{}{}", USER_PREFIX, created_at.timestamp_millis()) }
    }

    pub fn provenance(&self) -> Provenance {
        if self.content.starts_with(USER_PREFIX) {
            Provenance::UserOwned
        } else {
            Provenance::External
        }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl FromStr for OccurrenceId {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { content: s.to_string() })
    }
}

impl Display for OccurrenceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}

/// Used to support serde
impl Serialize for OccurrenceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.content)
    }
}
/// Used to support serde
impl<'de> Deserialize<'de> for OccurrenceId {
    fn deserialize<D>(deserializer: D) -> Result<OccurrenceId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let content = String::deserialize(deserializer)?;
        Ok(OccurrenceId{ content })
    }
}



/// The kind of an occurrence. Every kind has a label and a display colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Lecture,
    Sport,
    Personal,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Lecture, Category::Sport, Category::Personal];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Lecture => "Lecture",
            Category::Sport => "Sport",
            Category::Personal => "Personal",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Category::Lecture => Color::from_rgba8(0x4e, 0x91, 0xfc, 0xff),
            Category::Sport => Color::from_rgba8(0x4c, 0xaf, 0x50, 0xff),
            Category::Personal => Color::from_rgba8(0x9c, 0x27, 0xb0, 0xff),
        }
    }
}

impl Default for Category {
    /// Occurrences from the feed are lectures
    fn default() -> Self {
        Category::Lecture
    }
}



/// A scheduled occurrence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    id: OccurrenceId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    location: String,
    #[serde(rename = "startDate")]
    start: DateTime<Utc>,
    #[serde(rename = "endDate")]
    end: DateTime<Utc>,
    #[serde(default)]
    category: Category,
}

impl Occurrence {
    /// Create an occurrence from the fields of a feed entry.
    ///
    /// Feed entries are not validated: `end` may well be before `start`.
    pub fn new_external(id: OccurrenceId, title: String, description: String, location: String,
                        start: DateTime<Utc>, end: DateTime<Utc>) -> Self
    {
        Self::new_with_parameters(id, title, description, location, start, end, Category::default())
    }

    /// Create a new Occurrence instance. No check is performed on the consistency of the parameters
    pub fn new_with_parameters(id: OccurrenceId, title: String, description: String, location: String,
                               start: DateTime<Utc>, end: DateTime<Utc>, category: Category) -> Self
    {
        Self { id, title, description, location, start, end, category }
    }

    pub fn id(&self) -> &OccurrenceId       { &self.id          }
    pub fn title(&self) -> &str             { &self.title       }
    pub fn description(&self) -> &str       { &self.description }
    pub fn location(&self) -> &str          { &self.location    }
    pub fn start(&self) -> DateTime<Utc>    { self.start        }
    pub fn end(&self) -> DateTime<Utc>      { self.end          }
    pub fn category(&self) -> Category      { self.category     }
    pub fn provenance(&self) -> Provenance  { self.id.provenance() }

    /// The day this occurrence is filed under
    pub fn day_key(&self) -> DayKey {
        self.start.date_naive()
    }

    /// Whether two occurrences describe the same thing, regardless of their identities
    pub fn has_same_content_as(&self, other: &Occurrence) -> bool {
           self.title == other.title
        && self.description == other.description
        && self.location == other.location
        && self.start == other.start
        && self.end == other.end
        && self.category == other.category
    }
}


/// An occurrence the user is about to create (e.g. the content of a form)
#[derive(Clone, Debug, PartialEq)]
pub struct NewOccurrence {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub category: Category,
}

impl NewOccurrence {
    pub(crate) fn into_occurrence(self, id: OccurrenceId) -> Occurrence {
        Occurrence::new_with_parameters(id, self.title, self.description, self.location, self.start, self.end, self.category)
    }
}
