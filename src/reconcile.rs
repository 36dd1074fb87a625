//! Merging a freshly parsed feed with the records the user owns
//!
//! This is not a merge by identity. The feed has no reliable per-event versioning, so the whole external layer is thrown away and replaced at every refresh.
//! Only the records created by the user survive a refresh, untouched and under the day they were filed under.

use std::collections::BTreeMap;

use crate::occurrence::{DayKey, Occurrence, Provenance};

/// A day-keyed set of occurrences, as held by the [`EventStore`](crate::cache::EventStore)
pub type DayMap = BTreeMap<DayKey, Vec<Occurrence>>;

/// Compute the next state of the store from its `current` state and the occurrences of a feed.
///
/// * user-owned records of `current` are kept as is
/// * external records of `current` are dropped, whatever they are
/// * every occurrence of `fresh` is appended to the day of its start
/// * days that end up empty are omitted
pub fn reconcile<I>(current: &DayMap, fresh: I) -> DayMap
where
    I: IntoIterator<Item = Occurrence>,
{
    let mut next = DayMap::new();

    for (day, occurrences) in current {
        let kept: Vec<Occurrence> = occurrences.iter()
            .filter(|occ| occ.provenance() == Provenance::UserOwned)
            .cloned()
            .collect();
        if kept.is_empty() == false {
            next.insert(*day, kept);
        }
    }

    for occurrence in fresh {
        if occurrence.provenance() != Provenance::External {
            log::warn!("Feed occurrence {} has a user-owned identity. Ignoring it", occurrence.id());
            continue;
        }
        next.entry(occurrence.day_key())
            .or_insert_with(Vec::new)
            .push(occurrence);
    }

    next.retain(|_, occurrences| occurrences.is_empty() == false);
    next
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use crate::occurrence::{Category, OccurrenceId};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, day, hour, 0, 0).unwrap()
    }

    fn day(d: u32) -> DayKey {
        NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
    }

    fn external(title: &str, start: DateTime<Utc>, position: usize) -> Occurrence {
        Occurrence::new_external(OccurrenceId::external(Some("uid"), position), title.to_string(),
            String::new(), String::new(), start, start + Duration::hours(2))
    }

    fn user(title: &str, start: DateTime<Utc>) -> Occurrence {
        Occurrence::new_with_parameters(OccurrenceId::user_owned(start), title.to_string(),
            String::new(), String::new(), start, start + Duration::hours(1), Category::Personal)
    }

    #[test]
    fn empty_store_takes_the_feed() {
        let next = reconcile(&DayMap::new(), vec![external("Math", at(10, 8), 0)]);
        assert_eq!(next.len(), 1);
        let math = &next[&day(10)];
        assert_eq!(math.len(), 1);
        assert_eq!(math[0].title(), "Math");
        assert_eq!(math[0].provenance(), Provenance::External);
    }

    #[test]
    fn empty_feed_keeps_user_records() {
        let mut current = DayMap::new();
        current.insert(day(10), vec![user("Party", at(10, 20))]);

        let next = reconcile(&current, Vec::new());
        assert_eq!(next, current);
    }

    #[test]
    fn external_records_are_replaced() {
        let mut current = DayMap::new();
        current.insert(day(10), vec![external("Old math", at(10, 8), 0), user("Party", at(10, 20))]);
        current.insert(day(11), vec![external("Old physics", at(11, 8), 1)]);

        let next = reconcile(&current, vec![external("Chemistry", at(12, 8), 0), external("Math", at(10, 9), 1)]);

        assert_eq!(next.len(), 2);
        // user records come first, external ones are appended
        let titles: Vec<&str> = next[&day(10)].iter().map(|o| o.title()).collect();
        assert_eq!(titles, vec!["Party", "Math"]);
        assert!(next.contains_key(&day(11)) == false);
        assert_eq!(next[&day(12)][0].title(), "Chemistry");
    }

    #[test]
    fn merge_preserves_ownership() {
        let users = vec![user("Party", at(10, 20)), user("Gym", at(14, 7)), user("Dinner", at(14, 19))];
        let mut current = DayMap::new();
        for occ in &users {
            current.entry(occ.day_key()).or_insert_with(Vec::new).push(occ.clone());
        }
        current.entry(day(14)).or_insert_with(Vec::new).push(external("Stale", at(14, 8), 4));

        let fresh = vec![external("A", at(9, 8), 0), external("B", at(14, 10), 1), external("C", at(14, 23), 2)];
        let next = reconcile(&current, fresh.clone());

        let next_users: Vec<&Occurrence> = next.values().flatten()
            .filter(|o| o.provenance() == Provenance::UserOwned)
            .collect();
        assert_eq!(next_users.len(), users.len());
        for occ in &users {
            assert!(next[&occ.day_key()].contains(occ));
        }

        let next_external: Vec<&Occurrence> = next.values().flatten()
            .filter(|o| o.provenance() == Provenance::External)
            .collect();
        assert_eq!(next_external.len(), fresh.len());
        for occ in &fresh {
            assert!(next_external.contains(&occ));
        }

        // day-key grouping
        for (key, occurrences) in &next {
            assert!(occurrences.is_empty() == false);
            for occ in occurrences {
                assert_eq!(&occ.day_key(), key);
            }
        }
    }
}
