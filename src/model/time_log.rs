use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One student's attendance for one calendar date, with the submission
/// workflow folded in. At most one row exists per (student_id, log_date);
/// the table enforces this with a unique key.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TimeLog {
    pub log_id: u64,
    pub student_id: u64,
    pub application_id: u64,
    pub log_date: NaiveDate,
    pub time_in: Option<NaiveDateTime>,
    pub time_out: Option<NaiveDateTime>,
    pub total_hours: Option<Decimal>,
    pub status: LogStatus,
    pub modified_after_date: bool,
    pub remarks: Option<String>,
    pub submitted_at: Option<NaiveDateTime>,
    pub validated_at: Option<NaiveDateTime>,
    pub validated_by: Option<u64>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    Display,
    EnumString,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogStatus {
    /// Timed in, not yet timed out.
    Incomplete,
    /// Timed out (or validated as complete by the supervisor).
    Complete,
    /// Finalized by the student; awaiting supervisor validation.
    Submitted,
    Rejected,
}

impl LogStatus {
    /// Statuses whose hours count toward aggregate totals.
    pub fn counts_toward_totals(self) -> bool {
        matches!(self, LogStatus::Complete | LogStatus::Submitted)
    }
}

impl TimeLog {
    pub fn can_time_out(&self) -> Result<(), &'static str> {
        if self.time_in.is_none() {
            return Err("Please time in first");
        }
        if self.time_out.is_some() {
            return Err("Already timed out today");
        }
        Ok(())
    }

    /// Submission requires a finished attendance cycle and both narrative
    /// fields filled in.
    pub fn can_submit(
        &self,
        tasks: Option<&str>,
        accomplishments: Option<&str>,
    ) -> Result<(), &'static str> {
        if self.status == LogStatus::Submitted {
            return Err("Record already submitted");
        }
        if self.time_in.is_none() || self.time_out.is_none() {
            return Err("Please complete time-in and time-out before submitting");
        }
        let filled = |s: Option<&str>| s.map(|v| !v.trim().is_empty()).unwrap_or(false);
        if !filled(tasks) || !filled(accomplishments) {
            return Err("Please fill in both task and accomplishment before submitting");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn log(time_in: Option<(u32, u32)>, time_out: Option<(u32, u32)>, status: LogStatus) -> TimeLog {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let at = |(h, m)| date.and_hms_opt(h, m, 0).unwrap();
        TimeLog {
            log_id: 1,
            student_id: 1,
            application_id: 1,
            log_date: date,
            time_in: time_in.map(at),
            time_out: time_out.map(at),
            total_hours: time_out.map(|_| dec!(8.00)),
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
    fn time_out_requires_prior_time_in() {
        let open = log(None, None, LogStatus::Incomplete);
        assert_eq!(open.can_time_out(), Err("Please time in first"));
    }

    #[test]
    fn time_out_happens_once() {
        let done = log(Some((8, 0)), Some((17, 0)), LogStatus::Complete);
        assert_eq!(done.can_time_out(), Err("Already timed out today"));

        let open = log(Some((8, 0)), None, LogStatus::Incomplete);
        assert_eq!(open.can_time_out(), Ok(()));
    }

    #[test]
    fn submit_needs_both_timestamps() {
        let open = log(Some((8, 0)), None, LogStatus::Incomplete);
        assert_eq!(
            open.can_submit(Some("tasks"), Some("done")),
            Err("Please complete time-in and time-out before submitting")
        );
    }

    #[test]
    fn submit_needs_both_narrative_fields() {
        let done = log(Some((8, 0)), Some((17, 0)), LogStatus::Complete);
        assert!(done.can_submit(Some("tasks"), Some("done")).is_ok());
        assert!(done.can_submit(None, Some("done")).is_err());
        assert!(done.can_submit(Some("tasks"), Some("   ")).is_err());
    }

    #[test]
    fn submit_is_not_repeatable() {
        let submitted = log(Some((8, 0)), Some((17, 0)), LogStatus::Submitted);
        assert_eq!(
            submitted.can_submit(Some("tasks"), Some("done")),
            Err("Record already submitted")
        );
    }

    #[test]
    fn only_finished_logs_count_toward_totals() {
        assert!(LogStatus::Complete.counts_toward_totals());
        assert!(LogStatus::Submitted.counts_toward_totals());
        assert!(!LogStatus::Incomplete.counts_toward_totals());
        assert!(!LogStatus::Rejected.counts_toward_totals());
    }
}
