//! Workplace clock: calendar-day and end-of-workday boundaries.
//!
//! Timestamps are stored in UTC; day boundaries are computed in the
//! workplace's fixed UTC offset.

use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, TimeDelta, Utc};

use crate::error::{AllocatorError, AllocatorResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Workday {
    end: NaiveTime,
    offset: FixedOffset,
}

impl Workday {
    pub fn new(end_of_workday_hour: u32, utc_offset_minutes: i32) -> AllocatorResult<Self> {
        let end = NaiveTime::from_hms_opt(end_of_workday_hour, 0, 0).ok_or_else(|| {
            AllocatorError::Configuration(format!(
                "end of workday hour out of range: {end_of_workday_hour}"
            ))
        })?;
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AllocatorError::Configuration(format!(
                    "utc offset out of range: {utc_offset_minutes} minutes"
                ))
            })?;
        Ok(Self { end, offset })
    }

    /// Local midnight of the day containing `now`.
    pub fn start_of_day(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_day = now.with_timezone(&self.offset).date_naive();
        self.to_utc(local_day.and_time(NaiveTime::MIN))
    }

    /// End of the workday on the local day containing `now`.
    pub fn end_of_workday(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_day = now.with_timezone(&self.offset).date_naive();
        self.to_utc(local_day.and_time(self.end))
    }

    /// Whole hours between `now` and the end of the workday, floored and
    /// then taken as an absolute value. Past the end of the day this counts
    /// the hours already elapsed since it.
    pub fn hours_until_end(&self, now: DateTime<Utc>) -> u32 {
        let remaining = self.end_of_workday(now) - now;
        let hours = remaining.num_seconds().div_euclid(3600).unsigned_abs();
        u32::try_from(hours).unwrap_or(u32::MAX)
    }

    fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let shift = TimeDelta::seconds(i64::from(self.offset.local_minus_utc()));
        (local - shift).and_utc()
    }
}
