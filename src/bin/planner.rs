use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use student_planner::cache::EventStore;
use student_planner::client::Client;
use student_planner::countdown::CountdownList;
use student_planner::notification::{DispatchHandle, Notification, PermissionStatus};
use student_planner::reminder::{self, Scheduler};
use student_planner::settings::Settings;
use student_planner::storage::FolderStorage;
use student_planner::task_list::TaskList;
use student_planner::traits::NotificationDispatcher;
use student_planner::{BoxError, Provider};


/// Stands for the platform notification service: notifications are written to the log
struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn permission_status(&self) -> Result<PermissionStatus, BoxError> {
        Ok(PermissionStatus::Granted)
    }

    async fn request_permission(&self) -> Result<PermissionStatus, BoxError> {
        Ok(PermissionStatus::Granted)
    }

    async fn schedule_notification(&self, notification: Notification) -> Result<DispatchHandle, BoxError> {
        log::info!("[{:?}] {} - {}", notification.trigger, notification.title, notification.body);
        Ok(DispatchHandle::random())
    }
}


#[tokio::main]
async fn main() {
    env_logger::init();

    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = Settings::load(settings_path.as_deref());
    let storage = FolderStorage::new(&settings.storage_folder);

    let store = EventStore::load(storage.clone()).await;
    let provider = Provider::new(Client::from_settings(&settings), store);

    if provider.refresh(Utc::now()).await == false {
        log::warn!("Refresh did not complete, see the previous log lines for more info. Showing the stored events.");
    }

    {
        let local = provider.local();
        let local = local.lock().await;
        println!("---- Events -----");
        student_planner::utils::print_days(local.days());
        println!("---- Next events -----");
        for occurrence in local.upcoming(Utc::now(), 3) {
            student_planner::utils::print_occurrence(occurrence);
        }
    }

    {
        let countdowns = CountdownList::load(storage.clone()).await;
        let now = Utc::now();
        println!("---- Countdowns ({:.0}% of the school year) -----", settings.school_year.progress(now) * 100.0);
        for countdown in countdowns.countdowns() {
            println!("    {}\t{} day(s)\t{}", countdown.title(), countdown.days_remaining(now), countdown.urgency(now).color().to_hex_string());
        }
        if let Some(next) = countdowns.next(now) {
            println!("Only {} day(s) left until {}", next.days_remaining(now), next.title());
        }
    }

    let tasks = Arc::new(Mutex::new(TaskList::load(storage).await));
    {
        let tasks = tasks.lock().await;
        println!("---- Tasks ({:.0}% done) -----", tasks.completion_ratio() * 100.0);
        for task in tasks.active(Utc::now()) {
            student_planner::utils::print_task(task);
        }
    }

    let scheduler = Scheduler::new(tasks, Arc::new(LogDispatcher), settings.cooldown());
    let (ticker, handle) = reminder::ticker(scheduler, settings.poll_period());
    let running = tokio::spawn(ticker.run());

    println!("Watching reminders. Press Ctrl-C to quit.");
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Unable to listen for Ctrl-C: {}", err);
    }
    drop(handle);
    let _ = running.await;
}
