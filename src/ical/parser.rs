//! A module to parse calendar feeds

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;

use crate::occurrence::{Occurrence, OccurrenceId};

const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const DATE_FORMAT: &str = "%Y%m%d";


/// Parse the text of a calendar feed into occurrences (see [`FeedOccurrences`]).
///
/// This never fails: a malformed feed simply yields no occurrence.
/// Calling this twice on the same text yields the same sequence.
pub fn parse(content: &str) -> FeedOccurrences<'_> {
    FeedOccurrences {
        reader: ical::IcalParser::new(content.as_bytes()),
        pending: Vec::new().into_iter(),
        position: 0,
        found_calendar: false,
        failed: false,
        finished: false,
    }
}

/// A lazy sequence of the occurrences of a feed.
///
/// Events that have no valid start or end are skipped.
pub struct FeedOccurrences<'a> {
    reader: ical::IcalParser<&'a [u8]>,
    pending: std::vec::IntoIter<IcalEvent>,
    /// Index of the next event in the feed, skipped events included
    position: usize,
    found_calendar: bool,
    failed: bool,
    finished: bool,
}

impl<'a> FeedOccurrences<'a> {
    /// Whether the feed turned out not to be a calendar at all (or to be corrupt).
    ///
    /// This is only meaningful once the sequence has been exhausted.
    /// A valid calendar that contains no event is not a failure.
    pub fn has_failed(&self) -> bool {
        self.failed || (self.finished && self.found_calendar == false)
    }
}

impl<'a> Iterator for FeedOccurrences<'a> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        loop {
            if let Some(event) = self.pending.next() {
                let position = self.position;
                self.position += 1;
                match occurrence_from_event(&event, position) {
                    Some(occurrence) => return Some(occurrence),
                    None => continue,
                }
            }

            if self.finished {
                return None;
            }

            match self.reader.next() {
                None => self.finished = true,
                Some(Err(err)) => {
                    log::warn!("Unable to parse the calendar feed: {}", err);
                    self.failed = true;
                    self.finished = true;
                },
                Some(Ok(calendar)) => {
                    self.found_calendar = true;
                    self.pending = calendar.events.into_iter();
                },
            }
        }
    }
}


fn occurrence_from_event(event: &IcalEvent, position: usize) -> Option<Occurrence> {
    let properties = &event.properties;

    let start = match find_property(properties, "DTSTART").and_then(parse_instant) {
        None => {
            log::debug!("Skipping feed event #{}: missing or invalid start", position);
            return None;
        },
        Some(dt) => dt,
    };
    let end = match find_property(properties, "DTEND").and_then(parse_instant) {
        None => {
            log::debug!("Skipping feed event #{}: missing or invalid end", position);
            return None;
        },
        Some(dt) => dt,
    };

    let uid = find_property(properties, "UID").and_then(|prop| prop.value.as_deref());

    Some(Occurrence::new_external(
        OccurrenceId::external(uid, position),
        text_value(properties, "SUMMARY"),
        text_value(properties, "DESCRIPTION"),
        text_value(properties, "LOCATION"),
        start,
        end,
    ))
}

/// Returns the first property with this name
fn find_property<'p>(properties: &'p [Property], name: &str) -> Option<&'p Property> {
    properties.iter().find(|prop| prop.name.eq_ignore_ascii_case(name))
}

fn find_param<'p>(prop: &'p Property, name: &str) -> Option<&'p str> {
    prop.params.as_ref()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(|value| value.as_str())
}

/// The unescaped value of a text property, or an empty string if it is missing
fn text_value(properties: &[Property], name: &str) -> String {
    find_property(properties, name)
        .and_then(|prop| prop.value.as_deref())
        .map(unescape_text)
        .unwrap_or_default()
}

fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => result.push('\n'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}

/// Parse a `DTSTART`/`DTEND`-like property.
///
/// * `20250910T080000Z` is UTC
/// * `TZID=Europe/Paris:20250910T100000` is resolved in that zone (unknown zones are read as UTC)
/// * floating date-times and whole dates (`20250910`) are read as UTC
fn parse_instant(prop: &Property) -> Option<DateTime<Utc>> {
    let value = prop.value.as_deref()?.trim();

    if let Some(utc_value) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc_value, DATE_TIME_FORMAT).ok()?;
        return Some(Utc.from_utc_datetime(&naive));
    }

    let naive = match NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT) {
        Ok(naive) => naive,
        Err(_) => NaiveDate::parse_from_str(value, DATE_FORMAT).ok()?.and_hms_opt(0, 0, 0)?,
    };

    let tz = find_param(prop, "TZID").and_then(|tzid| match tzid.trim_matches('"').parse::<Tz>() {
        Ok(tz) => Some(tz),
        Err(_) => {
            log::debug!("Unknown time zone {:?}, reading the date as UTC", tzid);
            None
        },
    });

    match tz {
        None => Some(Utc.from_utc_datetime(&naive)),
        Some(tz) => tz.from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}


#[cfg(test)]
mod test {
    const EXAMPLE_FEED: &str = "BEGIN:VCALENDAR\r
VERSION:2.0\r
PRODID:-//ADE/version 6.0\r
BEGIN:VEVENT\r
UID:ADE1\r
DTSTAMP:20250901T000000Z\r
DTSTART:20250910T080000Z\r
DTEND:20250910T100000Z\r
SUMMARY:Math\r
LOCATION:Amphi A\r
DESCRIPTION:Linear algebra\\nGroup 2\\, room change\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:ADE2\r
DTSTART;TZID=Europe/Paris:20250911T100000\r
DTEND;TZID=Europe/Paris:20250911T120000\r
SUMMARY:Physics\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:ADE3\r
DTSTART:20250912T080000Z\r
SUMMARY:No end, skipped\r
END:VEVENT\r
BEGIN:VEVENT\r
DTSTART;VALUE=DATE:20250913\r
DTEND;VALUE=DATE:20250914\r
SUMMARY:Open day\r
END:VEVENT\r
END:VCALENDAR\r
";

    const EMPTY_FEED: &str = "BEGIN:VCALENDAR\r
VERSION:2.0\r
PRODID:-//ADE/version 6.0\r
END:VCALENDAR\r
";

    use super::*;
    use chrono::TimeZone;
    use crate::Provenance;
    use crate::Category;

    #[test]
    fn test_feed_parsing() {
        let mut occurrences = parse(EXAMPLE_FEED);
        let parsed: Vec<Occurrence> = occurrences.by_ref().collect();
        assert!(occurrences.has_failed() == false);
        assert_eq!(parsed.len(), 3);

        let math = &parsed[0];
        assert_eq!(math.id().as_str(), "feed-ADE1-0");
        assert_eq!(math.title(), "Math");
        assert_eq!(math.location(), "Amphi A");
        assert_eq!(math.description(), "Linear algebra\nGroup 2, room change");
        assert_eq!(math.start(), Utc.with_ymd_and_hms(2025, 9, 10, 8, 0, 0).unwrap());
        assert_eq!(math.end(), Utc.with_ymd_and_hms(2025, 9, 10, 10, 0, 0).unwrap());
        assert_eq!(math.provenance(), Provenance::External);
        assert_eq!(math.category(), Category::Lecture);

        let physics = &parsed[1];
        assert_eq!(physics.location(), "");
        assert_eq!(physics.description(), "");
        // Paris is UTC+2 in September
        assert_eq!(physics.start(), Utc.with_ymd_and_hms(2025, 9, 11, 8, 0, 0).unwrap());

        // Positions count skipped events too
        let open_day = &parsed[2];
        assert_eq!(open_day.id().as_str(), "feed-event-3");
        assert_eq!(open_day.day_key(), NaiveDate::from_ymd_opt(2025, 9, 13).unwrap());
    }

    #[test]
    fn test_parsing_is_restartable() {
        let first: Vec<Occurrence> = parse(EXAMPLE_FEED).collect();
        let second: Vec<Occurrence> = parse(EXAMPLE_FEED).collect();
        assert_eq!(first.len(), second.len());
        for (l, r) in first.iter().zip(second.iter()) {
            assert!(l.has_same_content_as(r));
        }
    }

    #[test]
    fn test_empty_calendar_is_not_a_failure() {
        let mut occurrences = parse(EMPTY_FEED);
        assert_eq!(occurrences.next(), None);
        assert!(occurrences.has_failed() == false);
    }

    #[test]
    fn test_garbage_yields_nothing() {
        for garbage in &["", "<html><body>502 Bad Gateway</body></html>"] {
            let mut occurrences = parse(garbage);
            assert_eq!(occurrences.by_ref().count(), 0);
            assert!(occurrences.has_failed());
        }
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_text(r"a\,b\;c\\d\ne"), "a,b;c\\d\ne");
        assert_eq!(unescape_text(r"trailing\"), "trailing\\");
    }
}
