use chrono::{Datelike, NaiveDateTime};

use crate::ojt::schedule::{WorkSchedule, weekday_name};

/// Classifies a stored log against the employer schedule and returns a
/// human-readable warning, or `None` for a clean log. Annotation only:
/// anomalous logs are never rejected here, but the aggregator excludes
/// flagged logs from totals.
pub fn validate_log(
    time_in: Option<NaiveDateTime>,
    time_out: Option<NaiveDateTime>,
    schedule: Option<&WorkSchedule>,
) -> Option<String> {
    let schedule = schedule?;
    let time_in = time_in?;

    let weekday = time_in.weekday();
    let Some(day) = schedule.day(weekday) else {
        return Some(format!("{} is not a working day", weekday_name(weekday)));
    };

    let time_out = time_out?;
    let in_time = time_in.time();
    let out_time = time_out.time();

    if out_time < day.start {
        Some(format!(
            "Time-out before work hours (starts at {})",
            day.start.format("%H:%M")
        ))
    } else if in_time > day.end {
        Some(format!(
            "Time-in after work hours (ends at {})",
            day.end.format("%H:%M")
        ))
    } else if in_time == out_time {
        Some("Time-in and time-out are the same".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const MONDAY_ONLY: &str = r#"{"Monday": {"start": "08:00", "end": "17:00",
                                 "breaks": [{"start": "12:00", "end": "13:00"}]}}"#;

    fn schedule() -> WorkSchedule {
        WorkSchedule::from_json(MONDAY_ONLY).unwrap()
    }

    fn on(day: u32, h: u32, m: u32) -> NaiveDateTime {
        // June 2025: the 2nd is a Monday, the 7th a Saturday.
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn clean_log_has_no_warning() {
        let warning = validate_log(Some(on(2, 8, 0)), Some(on(2, 17, 0)), Some(&schedule()));
        assert_eq!(warning, None);
    }

    #[test]
    fn non_working_day_is_flagged() {
        let warning = validate_log(Some(on(7, 8, 0)), Some(on(7, 17, 0)), Some(&schedule()));
        assert_eq!(warning.as_deref(), Some("Saturday is not a working day"));
    }

    #[test]
    fn time_out_before_work_hours() {
        let warning = validate_log(Some(on(2, 5, 0)), Some(on(2, 6, 30)), Some(&schedule()));
        assert_eq!(
            warning.as_deref(),
            Some("Time-out before work hours (starts at 08:00)")
        );
    }

    #[test]
    fn time_in_after_work_hours() {
        let warning = validate_log(Some(on(2, 18, 0)), Some(on(2, 19, 0)), Some(&schedule()));
        assert_eq!(
            warning.as_deref(),
            Some("Time-in after work hours (ends at 17:00)")
        );
    }

    #[test]
    fn identical_in_and_out() {
        let warning = validate_log(Some(on(2, 9, 0)), Some(on(2, 9, 0)), Some(&schedule()));
        assert_eq!(warning.as_deref(), Some("Time-in and time-out are the same"));
    }

    #[test]
    fn no_schedule_means_no_validation() {
        assert_eq!(validate_log(Some(on(7, 9, 0)), Some(on(7, 9, 0)), None), None);
    }

    #[test]
    fn open_log_on_working_day_is_clean() {
        // Timed in but not yet out: nothing to compare, no warning.
        assert_eq!(validate_log(Some(on(2, 8, 0)), None, Some(&schedule())), None);
    }
}
