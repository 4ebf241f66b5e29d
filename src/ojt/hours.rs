use chrono::{NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

/// Ordered, non-overlapping billable sub-sessions of one working day.
///
/// The standard window (7AM-12PM, 1PM-5PM) applies whenever no employer
/// schedule constrains the day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkWindow {
    sessions: Vec<(NaiveTime, NaiveTime)>,
}

impl WorkWindow {
    pub fn from_sessions(sessions: Vec<(NaiveTime, NaiveTime)>) -> Self {
        WorkWindow { sessions }
    }

    /// 07:00-12:00 and 13:00-17:00, excluding the lunch hour.
    pub fn standard() -> Self {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).expect("valid time");
        WorkWindow {
            sessions: vec![(t(7, 0), t(12, 0)), (t(13, 0), t(17, 0))],
        }
    }

    pub fn sessions(&self) -> &[(NaiveTime, NaiveTime)] {
        &self.sessions
    }

    /// Total billable hours the window can hold, rounded to 2 decimals.
    pub fn capacity_hours(&self) -> Decimal {
        let seconds: i64 = self
            .sessions
            .iter()
            .map(|(start, end)| (*end - *start).num_seconds())
            .sum();
        seconds_to_hours(seconds)
    }
}

fn seconds_to_hours(seconds: i64) -> Decimal {
    (Decimal::new(seconds, 0) / Decimal::new(3600, 0)).round_dp(2)
}

/// Hours worked between `time_in` and `time_out` that fall inside the
/// window's sessions. Time-in is effectively clamped up to the window start
/// and time-out down to the window end; anything outside (including breaks)
/// is not billable. Pure, no I/O.
pub fn calculate_valid_hours(
    time_in: NaiveDateTime,
    time_out: NaiveDateTime,
    window: &WorkWindow,
) -> Decimal {
    let in_time = time_in.time();
    let out_time = time_out.time();

    let mut total_seconds: i64 = 0;
    for (session_start, session_end) in window.sessions() {
        let overlap_start = in_time.max(*session_start);
        let overlap_end = out_time.min(*session_end);
        if overlap_end > overlap_start {
            total_seconds += (overlap_end - overlap_start).num_seconds();
        }
    }

    seconds_to_hours(total_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ojt::schedule::WorkSchedule;
    use chrono::{NaiveDate, Weekday};
    use rust_decimal_macros::dec;

    fn dt(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2) // a Monday
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn full_day_in_standard_window() {
        assert_eq!(
            calculate_valid_hours(dt(7, 0), dt(17, 0), &WorkWindow::standard()),
            dec!(9.00)
        );
    }

    #[test]
    fn clamping_is_idempotent_at_window_edges() {
        let window = WorkWindow::standard();
        let at_edges = calculate_valid_hours(dt(7, 0), dt(17, 0), &window);
        let outside = calculate_valid_hours(dt(5, 30), dt(21, 45), &window);
        assert_eq!(at_edges, outside);
    }

    #[test]
    fn lunch_break_is_excluded() {
        // 9 elapsed hours minus the 12:00-13:00 break.
        let raw = r#"{"Monday": {"start": "08:00", "end": "17:00",
                      "breaks": [{"start": "12:00", "end": "13:00"}]}}"#;
        let schedule = WorkSchedule::from_json(raw).unwrap();
        let window = schedule.day(Weekday::Mon).unwrap().window();
        assert_eq!(calculate_valid_hours(dt(8, 0), dt(17, 0), &window), dec!(8.00));
    }

    #[test]
    fn early_in_and_late_out_are_clamped() {
        // 07:45 in, 17:30 out against an 08:00-17:00 day with a lunch break.
        let raw = r#"{"Monday": {"start": "08:00", "end": "17:00",
                      "breaks": [{"start": "12:00", "end": "13:00"}]}}"#;
        let schedule = WorkSchedule::from_json(raw).unwrap();
        let window = schedule.day(Weekday::Mon).unwrap().window();
        assert_eq!(calculate_valid_hours(dt(7, 45), dt(17, 30), &window), dec!(8.00));
    }

    #[test]
    fn same_instant_yields_zero() {
        let window = WorkWindow::standard();
        for (h, m) in [(6, 0), (9, 30), (12, 30), (18, 0)] {
            assert_eq!(calculate_valid_hours(dt(h, m), dt(h, m), &window), dec!(0.00));
        }
    }

    #[test]
    fn entirely_outside_window_yields_zero() {
        let window = WorkWindow::standard();
        // Out before the window opens.
        assert_eq!(calculate_valid_hours(dt(5, 0), dt(6, 30), &window), dec!(0.00));
        // In after the window closes.
        assert_eq!(calculate_valid_hours(dt(17, 30), dt(19, 0), &window), dec!(0.00));
    }

    #[test]
    fn result_is_bounded_by_window_capacity() {
        let window = WorkWindow::standard();
        let capacity = window.capacity_hours();
        for (a, b) in [
            ((0, 0), (23, 59)),
            ((7, 0), (7, 0)),
            ((11, 59), (13, 1)),
            ((16, 59), (17, 0)),
            ((9, 15), (14, 45)),
        ] {
            let hours = calculate_valid_hours(dt(a.0, a.1), dt(b.0, b.1), &window);
            assert!(hours >= dec!(0.00));
            assert!(hours <= capacity);
        }
    }

    #[test]
    fn partial_morning_only() {
        let window = WorkWindow::standard();
        assert_eq!(calculate_valid_hours(dt(8, 0), dt(10, 30), &window), dec!(2.50));
    }

    #[test]
    fn spanning_the_lunch_gap_counts_both_sessions() {
        let window = WorkWindow::standard();
        // 11:00-14:00 holds 1h morning + 1h afternoon.
        assert_eq!(calculate_valid_hours(dt(11, 0), dt(14, 0), &window), dec!(2.00));
    }

    #[test]
    fn rounds_to_two_decimals() {
        let window = WorkWindow::standard();
        // 50 minutes = 0.8333... hours.
        let hours = calculate_valid_hours(
            dt(8, 0),
            NaiveDate::from_ymd_opt(2025, 6, 2)
                .unwrap()
                .and_hms_opt(8, 50, 0)
                .unwrap(),
            &window,
        );
        assert_eq!(hours, dec!(0.83));
    }
}
