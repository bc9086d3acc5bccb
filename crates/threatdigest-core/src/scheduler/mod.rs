mod schedule;
mod service;

pub use schedule::DailySchedule;
pub use service::{SchedulerService, SchedulerStatus};
