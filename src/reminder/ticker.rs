use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;

use crate::notification::{receipt_channel, Receipt, ReceiptReceiver, ReceiptSender};
use crate::traits::{NotificationDispatcher, Storage};

use super::{default_poll_period, Scheduler};


/// Create a [`Ticker`] that runs `scheduler` every `period`, and the handle to talk to it.
///
/// A zero `period` is replaced by [`default_poll_period`].
pub fn ticker<S, D>(scheduler: Scheduler<S, D>, period: std::time::Duration) -> (Ticker<S, D>, TickerHandle)
where
    S: Storage,
    D: NotificationDispatcher,
{
    let period = if period.is_zero() {
        log::warn!("Reminders cannot be evaluated with a zero period. Using {:?} instead", default_poll_period());
        default_poll_period()
    } else {
        period
    };
    let changes = Arc::new(Notify::new());
    let (receipt_sender, receipts) = receipt_channel();

    let ticker = Ticker {
        scheduler,
        period,
        changes: Arc::clone(&changes),
        receipts,
    };
    let handle = TickerHandle { changes, receipts: receipt_sender };
    (ticker, handle)
}


/// Owns the cadence of the reminder evaluations.
///
/// Reminders are evaluated on every period, and as soon as the task list has changed (see [`TickerHandle::tasks_changed`]).
/// Notification receipts are applied as they come.
pub struct Ticker<S, D>
where
    S: Storage,
    D: NotificationDispatcher,
{
    scheduler: Scheduler<S, D>,
    period: std::time::Duration,
    changes: Arc<Notify>,
    receipts: ReceiptReceiver,
}

impl<S, D> Ticker<S, D>
where
    S: Storage,
    D: NotificationDispatcher,
{
    /// Run until every [`TickerHandle`] (and every receipt sender cloned from one) has been dropped
    pub async fn run(mut self) {
        self.scheduler.ensure_permission().await;

        let mut interval = tokio::time::interval(self.period);
        // After a long sleep, a single evaluation is enough to catch up
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = interval.tick() => {
                    log::trace!("Periodic reminder evaluation");
                    self.evaluate().await;
                },
                _ = self.changes.notified() => {
                    log::trace!("Task list changed, evaluating reminders");
                    self.evaluate().await;
                },
                receipt = self.receipts.recv() => match receipt {
                    None => break,
                    Some(receipt) => {
                        self.scheduler.acknowledge(&receipt.payload.task_id, Utc::now()).await;
                    },
                },
            }
        }
        log::debug!("Reminder ticker stopped");
    }

    async fn evaluate(&self) {
        let notified = self.scheduler.evaluate(Utc::now()).await;
        if notified.is_empty() == false {
            log::info!("Notified {} task(s)", notified.len());
        }
    }
}


/// The way the rest of the app talks to a running [`Ticker`]
#[derive(Clone)]
pub struct TickerHandle {
    changes: Arc<Notify>,
    receipts: ReceiptSender,
}

impl TickerHandle {
    /// Tell the ticker the task list has changed, so that reminders are evaluated again
    pub fn tasks_changed(&self) {
        self.changes.notify_one();
    }

    /// Forward a notification receipt from the platform
    pub fn receipt(&self, receipt: Receipt) {
        if self.receipts.send(receipt).is_err() {
            log::debug!("Reminder ticker is not running, dropping a notification receipt");
        }
    }

    /// A sender the platform glue can push receipts into
    pub fn receipt_sender(&self) -> ReceiptSender {
        self.receipts.clone()
    }
}
