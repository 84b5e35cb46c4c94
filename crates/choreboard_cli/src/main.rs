//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `choreboard_core` wiring outside any mobile runtime.
//! - Print a deterministic-format household summary for quick sanity checks.

use choreboard_core::{
    core_version, due_label, init_logging, AppConfig, HouseholdService, SystemClock, TaskFilter,
    TaskStore,
};
use log::info;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("choreboard: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("choreboard: logging disabled: {err}");
        }
    }

    let store = if config.seed_sample_data {
        TaskStore::with_sample_data(SystemClock)
    } else {
        TaskStore::new(SystemClock)
    };
    let service = HouseholdService::with_first_parent(store);
    info!(
        "event=cli_start module=cli status=ok seed={} gestures={}",
        config.seed_sample_data, config.sheet.gestures_enabled
    );
    let stats = service.dashboard();

    println!("choreboard_core version={}", core_version());
    println!(
        "tasks total={} completed={} pending={} overdue={} rate={}%",
        stats.total, stats.completed, stats.pending, stats.overdue, stats.completion_rate
    );
    for entry in &stats.categories {
        println!(
            "category name={} done={}/{} rate={}%",
            entry.category.label(),
            entry.stats.completed,
            entry.stats.total,
            entry.stats.percentage
        );
    }
    for child in &stats.children {
        println!(
            "child name={} done={}/{} points={}",
            child.user.name, child.stats.completed, child.stats.total, child.points
        );
    }
    if let Some(top) = &stats.top_performer {
        println!("top_performer={}", top.name);
    }

    let now = service.store().now_ms();
    for task in service.store().list_tasks_filtered(TaskFilter::Pending) {
        let state = if task.is_overdue(now) { "overdue" } else { "due" };
        println!("pending title={} {state}={}", task.title, due_label(task.due_date, now));
    }
    ExitCode::SUCCESS
}
