//! Schedule command handlers: install, remove, status.

use anyhow::{Context, Result};
use dmw_export_core::schedule::{
    self, MonthlySchedule, RemoveOutcome, ScheduleDay, TASK_NAME,
};

use crate::cli::{ScheduleCommand, ScheduleInstallArgs};

pub(crate) fn schedule_from_args(args: &ScheduleInstallArgs) -> MonthlySchedule {
    MonthlySchedule {
        hour: args.hour,
        minute: args.minute,
        day: args.day.map_or(ScheduleDay::LastDay, ScheduleDay::Day),
    }
}

pub(crate) fn run_schedule_command(command: &ScheduleCommand) -> Result<()> {
    match command {
        ScheduleCommand::Install(args) => {
            let exe = std::env::current_exe().context("cannot locate the running executable")?;
            let plan = schedule_from_args(args);
            schedule::install(&exe.display().to_string(), &args.extra_args, &plan)?;
            let when = match plan.day {
                ScheduleDay::LastDay => "last day".to_string(),
                ScheduleDay::Day(day) => format!("day {day}"),
            };
            println!(
                "Scheduled '{TASK_NAME}': monthly on the {when} at {:02}:{:02}",
                plan.hour, plan.minute
            );
        }
        ScheduleCommand::Remove => match schedule::remove()? {
            RemoveOutcome::Removed => println!("Removed '{TASK_NAME}'"),
            RemoveOutcome::NotPresent => println!("'{TASK_NAME}' is not present"),
        },
        ScheduleCommand::Status => {
            if schedule::task_exists()? {
                println!("'{TASK_NAME}' is installed");
            } else {
                println!("'{TASK_NAME}' is not installed");
            }
        }
    }
    Ok(())
}
