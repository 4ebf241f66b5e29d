use std::collections::HashMap;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::ojt::hours::WorkWindow;

/// A break period inside a working day, e.g. the lunch hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Working hours for a single weekday. Breaks are kept sorted by start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub breaks: Vec<BreakInterval>,
}

impl DaySchedule {
    /// Splits [start, end] around the breaks into billable sub-sessions.
    pub fn window(&self) -> WorkWindow {
        let mut sessions = Vec::with_capacity(self.breaks.len() + 1);
        let mut cursor = self.start;
        for b in &self.breaks {
            if b.start > cursor {
                sessions.push((cursor, b.start));
            }
            cursor = cursor.max(b.end);
        }
        if cursor < self.end {
            sessions.push((cursor, self.end));
        }
        WorkWindow::from_sessions(sessions)
    }
}

/// Per-employer weekly schedule. A weekday absent from the map is a
/// non-working day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkSchedule {
    days: HashMap<Weekday, DaySchedule>,
}

/// Wire format of one day as stored in `employers.work_schedule`:
/// `{"start": "HH:MM", "end": "HH:MM", "breaks": [{"start", "end"}, ...]}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DayScheduleDto {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub breaks: Vec<BreakDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BreakDto {
    pub start: String,
    pub end: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ScheduleError {
    Malformed(String),
    UnknownWeekday(String),
    BadTime(String),
    StartNotBeforeEnd(String),
    BreakOutsideDay(String),
    OverlappingBreaks(String),
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::Malformed(e) => write!(f, "work schedule is not valid JSON: {}", e),
            ScheduleError::UnknownWeekday(d) => write!(f, "unknown weekday '{}'", d),
            ScheduleError::BadTime(t) => write!(f, "invalid time '{}', expected HH:MM", t),
            ScheduleError::StartNotBeforeEnd(d) => {
                write!(f, "{}: start must be before end", d)
            }
            ScheduleError::BreakOutsideDay(d) => {
                write!(f, "{}: break falls outside working hours", d)
            }
            ScheduleError::OverlappingBreaks(d) => write!(f, "{}: breaks overlap", d),
        }
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| ScheduleError::BadTime(raw.to_string()))
}

/// Full weekday name used on the wire and in warnings ("Monday", ...).
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

impl WorkSchedule {
    pub fn day(&self, weekday: Weekday) -> Option<&DaySchedule> {
        self.days.get(&weekday)
    }

    pub fn is_working_day(&self, weekday: Weekday) -> bool {
        self.days.contains_key(&weekday)
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Strict parse of the JSON column, enforcing the schedule invariants.
    /// Used when an employer saves a schedule, so violations surface as 400s.
    pub fn from_json(raw: &str) -> Result<Self, ScheduleError> {
        let wire: HashMap<String, Option<DayScheduleDto>> =
            serde_json::from_str(raw).map_err(|e| ScheduleError::Malformed(e.to_string()))?;
        Self::from_wire(wire)
    }

    pub fn from_wire(
        wire: HashMap<String, Option<DayScheduleDto>>,
    ) -> Result<Self, ScheduleError> {
        let mut days = HashMap::new();
        for (name, dto) in wire {
            let Some(dto) = dto else { continue };
            let weekday: Weekday = name
                .parse()
                .map_err(|_| ScheduleError::UnknownWeekday(name.clone()))?;
            let start = parse_time(&dto.start)?;
            let end = parse_time(&dto.end)?;
            if start >= end {
                return Err(ScheduleError::StartNotBeforeEnd(name));
            }
            let mut breaks = Vec::with_capacity(dto.breaks.len());
            for b in &dto.breaks {
                let b_start = parse_time(&b.start)?;
                let b_end = parse_time(&b.end)?;
                if b_start >= b_end {
                    return Err(ScheduleError::StartNotBeforeEnd(name));
                }
                if b_start < start || b_end > end {
                    return Err(ScheduleError::BreakOutsideDay(name));
                }
                breaks.push(BreakInterval {
                    start: b_start,
                    end: b_end,
                });
            }
            breaks.sort_by_key(|b| b.start);
            if breaks.windows(2).any(|w| w[1].start < w[0].end) {
                return Err(ScheduleError::OverlappingBreaks(name));
            }
            days.insert(weekday, DaySchedule { start, end, breaks });
        }
        Ok(WorkSchedule { days })
    }

    /// Lenient parse for read paths. Absent or malformed JSON means "no
    /// schedule constraint"; the problem is logged, never surfaced to the
    /// caller.
    pub fn parse_lenient(raw: Option<&str>) -> Option<Self> {
        let raw = raw?.trim();
        if raw.is_empty() {
            return None;
        }
        match Self::from_json(raw) {
            Ok(schedule) if !schedule.is_empty() => Some(schedule),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unusable work schedule");
                None
            }
        }
    }

    /// Canonical JSON for the `employers.work_schedule` column.
    pub fn to_json_string(&self) -> String {
        let mut wire = serde_json::Map::new();
        let mut ordered: Vec<_> = self.days.iter().collect();
        ordered.sort_by_key(|(day, _)| day.num_days_from_monday());
        for (day, sched) in ordered {
            let breaks: Vec<_> = sched
                .breaks
                .iter()
                .map(|b| {
                    json!({
                        "start": b.start.format("%H:%M").to_string(),
                        "end": b.end.format("%H:%M").to_string(),
                    })
                })
                .collect();
            wire.insert(
                weekday_name(*day).to_string(),
                json!({
                    "start": sched.start.format("%H:%M").to_string(),
                    "end": sched.end.format("%H:%M").to_string(),
                    "breaks": breaks,
                }),
            );
        }
        serde_json::Value::Object(wire).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parses_wire_schedule() {
        let raw = r#"{"Monday": {"start": "08:00", "end": "17:00",
                      "breaks": [{"start": "12:00", "end": "13:00"}]}}"#;
        let schedule = WorkSchedule::from_json(raw).unwrap();
        let monday = schedule.day(Weekday::Mon).unwrap();
        assert_eq!(monday.start, t(8, 0));
        assert_eq!(monday.end, t(17, 0));
        assert_eq!(monday.breaks.len(), 1);
        assert!(!schedule.is_working_day(Weekday::Sun));
    }

    #[test]
    fn absent_weekday_is_non_working() {
        let schedule =
            WorkSchedule::from_json(r#"{"Tuesday": {"start": "09:00", "end": "18:00"}}"#).unwrap();
        assert!(schedule.is_working_day(Weekday::Tue));
        assert!(!schedule.is_working_day(Weekday::Wed));
    }

    #[test]
    fn null_day_means_non_working() {
        let schedule = WorkSchedule::from_json(
            r#"{"Monday": null, "Friday": {"start": "07:00", "end": "16:00"}}"#,
        )
        .unwrap();
        assert!(!schedule.is_working_day(Weekday::Mon));
        assert!(schedule.is_working_day(Weekday::Fri));
    }

    #[test]
    fn rejects_start_after_end() {
        let err = WorkSchedule::from_json(r#"{"Monday": {"start": "17:00", "end": "08:00"}}"#)
            .unwrap_err();
        assert_eq!(err, ScheduleError::StartNotBeforeEnd("Monday".into()));
    }

    #[test]
    fn rejects_break_outside_working_hours() {
        let raw = r#"{"Monday": {"start": "08:00", "end": "17:00",
                      "breaks": [{"start": "06:00", "end": "07:00"}]}}"#;
        assert_eq!(
            WorkSchedule::from_json(raw).unwrap_err(),
            ScheduleError::BreakOutsideDay("Monday".into())
        );
    }

    #[test]
    fn rejects_overlapping_breaks() {
        let raw = r#"{"Monday": {"start": "08:00", "end": "17:00",
                      "breaks": [{"start": "10:00", "end": "12:00"},
                                 {"start": "11:00", "end": "13:00"}]}}"#;
        assert_eq!(
            WorkSchedule::from_json(raw).unwrap_err(),
            ScheduleError::OverlappingBreaks("Monday".into())
        );
    }

    #[test]
    fn lenient_parse_swallows_garbage() {
        assert!(WorkSchedule::parse_lenient(Some("not json")).is_none());
        assert!(WorkSchedule::parse_lenient(Some("")).is_none());
        assert!(WorkSchedule::parse_lenient(None).is_none());
        assert!(WorkSchedule::parse_lenient(Some("{}")).is_none());
    }

    #[test]
    fn window_splits_around_breaks() {
        let raw = r#"{"Monday": {"start": "08:00", "end": "17:00",
                      "breaks": [{"start": "12:00", "end": "13:00"}]}}"#;
        let schedule = WorkSchedule::from_json(raw).unwrap();
        let window = schedule.day(Weekday::Mon).unwrap().window();
        assert_eq!(window.sessions(), &[(t(8, 0), t(12, 0)), (t(13, 0), t(17, 0))]);
    }

    #[test]
    fn round_trips_canonical_json() {
        let raw = r#"{"Monday": {"start": "08:00", "end": "17:00",
                      "breaks": [{"start": "12:00", "end": "13:00"}]}}"#;
        let schedule = WorkSchedule::from_json(raw).unwrap();
        let reparsed = WorkSchedule::from_json(&schedule.to_json_string()).unwrap();
        assert_eq!(schedule, reparsed);
    }
}
