//! Some utility functions

use crate::occurrence::{DayKey, Occurrence, Provenance};
use crate::reconcile::DayMap;
use crate::task::Task;

/// A debug utility that pretty-prints a day-keyed set of occurrences
pub fn print_days(days: &DayMap) {
    for (day, occurrences) in days {
        println!("DAY {}", day);
        for occurrence in occurrences {
            print_occurrence(occurrence);
        }
    }
}

pub fn print_occurrence(occurrence: &Occurrence) {
    let origin = match occurrence.provenance() {
        Provenance::External => "~",
        Provenance::UserOwned => "*",
    };
    println!("    {} {}-{} {}\t[{}]\t{}",
        origin,
        occurrence.start().format("%H:%M"),
        occurrence.end().format("%H:%M"),
        occurrence.title(),
        occurrence.category().label(),
        occurrence.id());
    if occurrence.location().is_empty() == false {
        println!("        @ {}", occurrence.location());
    }
}

pub fn print_task(task: &Task) {
    let completion = if task.done() { "✓" } else { " " };
    let reminder = task.reminder_date()
        .map(|date| format!("\t(reminder {})", date.to_rfc3339()))
        .unwrap_or_default();
    println!("    {} {}{}", completion, task.text(), reminder);
}


/// Compare two day-keyed sets of occurrences, regardless of the identities of their occurrences
pub fn have_same_content(left: &DayMap, right: &DayMap) -> bool {
    let keys_l: Vec<&DayKey> = left.keys().collect();
    let keys_r: Vec<&DayKey> = right.keys().collect();
    if keys_l != keys_r {
        log::debug!("Days mismatch: {:?} and {:?}", keys_l, keys_r);
        return false;
    }

    for (day, occurrences_l) in left {
        let occurrences_r = &right[day];
        if occurrences_l.len() != occurrences_r.len() {
            log::debug!("Count of occurrences mismatch on {}: {} and {}", day, occurrences_l.len(), occurrences_r.len());
            return false;
        }
        for (occ_l, occ_r) in occurrences_l.iter().zip(occurrences_r) {
            if occ_l.has_same_content_as(occ_r) == false {
                log::debug!("Occurrences {} and {} differ", occ_l.id(), occ_r.id());
                return false;
            }
        }
    }
    true
}
