use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Free-text narrative for one OJT day, 1:1 with its time log. Never
/// created before the student has timed in for that date.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyAccomplishment {
    pub accomplishment_id: u64,
    pub log_id: u64,
    pub student_id: u64,
    pub log_date: NaiveDate,
    pub tasks: Option<String>,
    pub accomplishments: Option<String>,
}
