use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::model::NewTask;

pub const DEFAULT_CATEGORY: &str = "General";

const MIN_CONTENT_CHARS: usize = 3;

/// Why a create submission was rejected. The `Display` text is what the user
/// sees in the flash banner.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Task content must be at least 3 characters long.")]
    InvalidContent,
    #[error("A deadline date is required.")]
    MissingDeadlineDate,
    #[error("Deadline must use the YYYY-MM-DD date and HH:MM time formats.")]
    InvalidDateTimeFormat,
    #[error("That deadline has already passed.")]
    PastDeadline,
}

fn default_deadline_time() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap()
}

/// Turn raw form strings into a well-formed task, first failure wins.
///
/// The deadline date is mandatory, the time optional (defaulting to 17:00).
/// A deadline strictly before `now` is rejected; one equal to `now` is
/// accepted. `now` is passed in so callers and tests control the clock.
pub fn new_task(
    content: &str,
    category: &str,
    date: &str,
    time: &str,
    location: &str,
    now: NaiveDateTime,
) -> Result<NewTask, ValidationError> {
    let content = content.trim();
    if content.chars().count() < MIN_CONTENT_CHARS {
        return Err(ValidationError::InvalidContent);
    }

    let date = date.trim();
    if date.is_empty() {
        return Err(ValidationError::MissingDeadlineDate);
    }
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDateTimeFormat)?;

    let time = time.trim();
    let time = if time.is_empty() {
        default_deadline_time()
    } else {
        NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|_| ValidationError::InvalidDateTimeFormat)?
    };

    let deadline = date.and_time(time);
    if deadline < now {
        return Err(ValidationError::PastDeadline);
    }

    let category = category.trim();
    let category = if category.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        category.to_string()
    };

    let location = location.trim();
    let location = (!location.is_empty()).then(|| location.to_string());

    Ok(NewTask {
        content: content.to_string(),
        category,
        deadline,
        location,
    })
}
