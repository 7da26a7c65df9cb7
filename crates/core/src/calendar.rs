use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use types::{DateRange, ScheduleConfig};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("invalid week number {0}: teaching weeks are numbered from 1")]
    InvalidWeekNumber(u32),
    #[error("week {requested} is beyond the configured {total} teaching weeks")]
    WeekOutOfRange { requested: u32, total: u32 },
}

/// Displayed date range of one teaching week.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeekRange {
    pub monday: NaiveDate,
    pub friday: NaiveDate,
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.weekday().num_days_from_monday() as u64)
}

/// A week is skipped only when all 7 of its days fall inside some vacation
/// period; partial overlap keeps the week.
fn fully_in_vacation(monday: NaiveDate, vacations: &[DateRange]) -> bool {
    if vacations.is_empty() {
        return false;
    }
    (0..7).all(|d| {
        let day = monday + Days::new(d);
        vacations.iter().any(|v| v.contains(day))
    })
}

/// Resolves teaching week `week_number` (1-based) to calendar dates, walking
/// forward from the configured start date and skipping vacation weeks.
pub fn week_range(config: &ScheduleConfig, week_number: u32) -> Result<WeekRange, CalendarError> {
    if week_number == 0 {
        return Err(CalendarError::InvalidWeekNumber(week_number));
    }
    if week_number > config.total_weeks {
        return Err(CalendarError::WeekOutOfRange {
            requested: week_number,
            total: config.total_weeks,
        });
    }

    let mut monday = monday_of(config.start_date);
    let mut counted = 0u32;
    loop {
        if !fully_in_vacation(monday, &config.vacation_periods) {
            counted += 1;
            if counted == week_number {
                return Ok(WeekRange {
                    monday,
                    friday: monday + Days::new(4),
                });
            }
        }
        monday = monday + Days::new(7);
    }
}
