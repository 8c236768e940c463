use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub content: String,
    pub category: String,
    pub deadline: Option<NaiveDateTime>,
    pub location: Option<String>,
    pub completed: bool,
}

impl Task {
    /// An open task whose deadline is behind the given instant.
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        !self.completed && matches!(self.deadline, Some(d) if d < now)
    }

    /// An open task due later today.
    pub fn is_due_today(&self, now: NaiveDateTime) -> bool {
        !self.completed && matches!(self.deadline, Some(d) if d >= now && d.date() == now.date())
    }
}

/// A validated creation payload. Unlike stored rows, the deadline is always
/// present: the create path requires a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub content: String,
    pub category: String,
    pub deadline: NaiveDateTime,
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn task(deadline: Option<NaiveDateTime>, completed: bool) -> Task {
        Task {
            id: 1,
            content: "Buy milk".to_string(),
            category: "General".to_string(),
            deadline,
            location: None,
            completed,
        }
    }

    #[test]
    fn overdue_and_due_today() {
        let now = at(2024, 6, 1, 12, 0);
        assert!(task(Some(at(2024, 5, 31, 17, 0)), false).is_overdue(now));
        assert!(task(Some(at(2024, 6, 1, 9, 0)), false).is_overdue(now));
        assert!(task(Some(at(2024, 6, 1, 17, 0)), false).is_due_today(now));
        assert!(!task(Some(at(2024, 6, 2, 17, 0)), false).is_due_today(now));
        assert!(!task(None, false).is_overdue(now));
    }

    #[test]
    fn completed_tasks_are_never_emphasized() {
        let now = at(2024, 6, 1, 12, 0);
        assert!(!task(Some(at(2024, 5, 31, 17, 0)), true).is_overdue(now));
        assert!(!task(Some(at(2024, 6, 1, 17, 0)), true).is_due_today(now));
    }
}
