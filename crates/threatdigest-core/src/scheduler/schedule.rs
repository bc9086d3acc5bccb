use chrono::{DateTime, Days, NaiveTime, TimeZone};

use crate::config::ScheduleConfig;
use crate::{Error, Result};

/// A fixed local time of day at which the digest runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    time: NaiveTime,
}

impl DailySchedule {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            Error::Config(format!("Invalid schedule time {:02}:{:02}", hour, minute))
        })?;
        Ok(Self { time })
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        Self::new(config.hour, config.minute)
    }

    /// The first scheduled time strictly after `now`, in `now`'s time zone.
    ///
    /// A time that falls into a DST gap on some day moves to the next day on
    /// which it exists; an ambiguous time resolves to its earlier instance.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let today = now.date_naive();

        for offset in 0..=2u64 {
            let Some(day) = today.checked_add_days(Days::new(offset)) else {
                break;
            };
            if let Some(candidate) = tz.from_local_datetime(&day.and_time(self.time)).earliest() {
                if candidate > *now {
                    return candidate;
                }
            }
        }

        now.clone() + chrono::Duration::days(1)
    }

    /// Human-readable form, e.g. "08:00 daily"
    pub fn describe(&self) -> String {
        format!("{} daily", self.time.format("%H:%M"))
    }
}
