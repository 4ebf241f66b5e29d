use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use strum::Display;

use crate::model::time_log::TimeLog;
use crate::ojt::schedule::WorkSchedule;
use crate::ojt::validator::validate_log;

/// OJT lifecycle derived from the accepted application and the hour total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OjtStatus {
    NotStarted,
    Ongoing,
    Completed,
}

#[derive(Debug, Clone, Serialize)]
pub struct HoursSummary {
    pub total_hours: Decimal,
    /// Logs that passed validation and counted toward the total.
    pub valid_days: u32,
    /// Logs excluded from the total by a validation warning.
    pub flagged_logs: u32,
}

/// Sums valid hours across a student's logs. Only finished logs count, and
/// logs the validator flags against the employer schedule are excluded
/// from both the total and the day count. Per-day values are already
/// rounded to 2 decimals when stored, so the sum needs no re-rounding.
pub fn summarize(logs: &[TimeLog], schedule: Option<&WorkSchedule>) -> HoursSummary {
    let mut total_hours = Decimal::ZERO;
    let mut valid_days = 0u32;
    let mut flagged_logs = 0u32;

    for log in logs {
        if !log.status.counts_toward_totals() {
            continue;
        }
        if validate_log(log.time_in, log.time_out, schedule).is_some() {
            flagged_logs += 1;
            continue;
        }
        total_hours += log.total_hours.unwrap_or(Decimal::ZERO);
        valid_days += 1;
    }

    HoursSummary {
        total_hours,
        valid_days,
        flagged_logs,
    }
}

/// `not_started` until an accepted application's start date has been
/// reached, `completed` once the valid-hour total meets the student's
/// target, `ongoing` in between.
pub fn lifecycle_status(
    ojt_start_date: Option<NaiveDate>,
    today: NaiveDate,
    total_hours: Decimal,
    required_hours: Decimal,
) -> OjtStatus {
    match ojt_start_date {
        Some(start) if today >= start => {
            if total_hours >= required_hours {
                OjtStatus::Completed
            } else {
                OjtStatus::Ongoing
            }
        }
        _ => OjtStatus::NotStarted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::time_log::LogStatus;
    use chrono::NaiveDateTime;
    use rust_decimal_macros::dec;

    const MONDAY_ONLY: &str = r#"{"Monday": {"start": "08:00", "end": "17:00",
                                 "breaks": [{"start": "12:00", "end": "13:00"}]}}"#;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn finished(day: u32, hours: Decimal, status: LogStatus) -> TimeLog {
        TimeLog {
            log_id: day as u64,
            student_id: 1,
            application_id: 1,
            log_date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            time_in: Some(at(day, 8, 0)),
            time_out: Some(at(day, 17, 0)),
            total_hours: Some(hours),
            status,
            modified_after_date: false,
            remarks: None,
            submitted_at: None,
            validated_at: None,
            validated_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn sums_per_day_rounded_values() {
        // 2.33 + 2.33 + 2.34 stays exactly 7.00 because each day was
        // rounded before summation, not once at the end.
        let logs = vec![
            finished(2, dec!(2.33), LogStatus::Complete),
            finished(9, dec!(2.33), LogStatus::Complete),
            finished(16, dec!(2.34), LogStatus::Submitted),
        ];
        let summary = summarize(&logs, None);
        assert_eq!(summary.total_hours, dec!(7.00));
        assert_eq!(summary.valid_days, 3);
        assert_eq!(summary.flagged_logs, 0);
    }

    #[test]
    fn unfinished_and_rejected_logs_do_not_count() {
        let mut open = finished(2, dec!(4.00), LogStatus::Incomplete);
        open.time_out = None;
        open.total_hours = None;
        let logs = vec![
            open,
            finished(9, dec!(8.00), LogStatus::Rejected),
            finished(16, dec!(8.00), LogStatus::Complete),
        ];
        let summary = summarize(&logs, None);
        assert_eq!(summary.total_hours, dec!(8.00));
        assert_eq!(summary.valid_days, 1);
    }

    #[test]
    fn flagged_logs_are_excluded_from_the_total() {
        let schedule = WorkSchedule::from_json(MONDAY_ONLY).unwrap();
        let logs = vec![
            finished(2, dec!(8.00), LogStatus::Complete), // Monday, clean
            finished(7, dec!(8.00), LogStatus::Complete), // Saturday, flagged
        ];
        let summary = summarize(&logs, Some(&schedule));
        assert_eq!(summary.total_hours, dec!(8.00));
        assert_eq!(summary.valid_days, 1);
        assert_eq!(summary.flagged_logs, 1);
    }

    #[test]
    fn no_schedule_counts_every_finished_log() {
        let logs = vec![
            finished(2, dec!(8.00), LogStatus::Complete),
            finished(7, dec!(8.00), LogStatus::Complete),
        ];
        let summary = summarize(&logs, None);
        assert_eq!(summary.total_hours, dec!(16.00));
        assert_eq!(summary.valid_days, 2);
    }

    #[test]
    fn lifecycle_before_start_date() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let later = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        assert_eq!(
            lifecycle_status(None, today, dec!(0.00), dec!(486)),
            OjtStatus::NotStarted
        );
        assert_eq!(
            lifecycle_status(Some(later), today, dec!(0.00), dec!(486)),
            OjtStatus::NotStarted
        );
    }

    #[test]
    fn lifecycle_crosses_the_required_hours_boundary() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        assert_eq!(
            lifecycle_status(Some(start), today, dec!(485.99), dec!(486)),
            OjtStatus::Ongoing
        );
        assert_eq!(
            lifecycle_status(Some(start), today, dec!(486.00), dec!(486)),
            OjtStatus::Completed
        );
        assert_eq!(
            lifecycle_status(Some(start), today, dec!(490.25), dec!(486)),
            OjtStatus::Completed
        );
    }
}
