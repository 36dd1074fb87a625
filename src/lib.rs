//! This crate provides the data core of a student planner.
//!
//! It fetches an external calendar feed with the [`client`] module, parses it in the [`ical`] module, and merges it with the events the user created by hand in a local store (the [`cache`] module). \
//! The merge never destroys user data: every refresh replaces the events that came from the feed, and only them (see [`reconcile`]).
//!
//! A [`Provider`](provider::Provider) ties these pieces together and runs a refresh.
//!
//! This crate also keeps a to-do list (the [`task_list`] module), and evaluates its reminders on a recurring cadence, in the [`reminder`] module. \
//! An unacknowledged reminder is notified again every now and then, until the task is done.
//!
//! Countdowns to important dates live in the [`countdown`] module.

pub mod traits;
pub mod error;
pub use error::{BoxError, ValidationError};

mod occurrence;
pub use occurrence::{Category, DayKey, NewOccurrence, Occurrence, OccurrenceId, Provenance};
mod task;
pub use task::{Task, TaskId};
pub mod notification;

pub mod ical;
pub mod reconcile;
pub mod storage;
pub mod cache;
pub mod task_list;
pub mod countdown;
pub mod client;
pub mod provider;
pub use provider::Provider;
pub mod reminder;

pub mod settings;
pub mod utils;
