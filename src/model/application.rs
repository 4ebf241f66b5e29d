use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Read-side view of an internship application. The attendance core only
/// consumes `status == accepted` rows and never mutates them.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct InternshipApplication {
    pub application_id: u64,
    pub student_id: u64,
    pub internship_id: u64,
    pub status: String,
    pub ojt_start_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Internship {
    pub internship_id: u64,
    pub employer_id: u64,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employer {
    pub employer_id: u64,
    pub user_id: u64,
    pub company_name: String,
    /// Weekly schedule as a JSON string; parsed once at the boundary by
    /// `ojt::schedule::WorkSchedule`.
    pub work_schedule: Option<String>,
}
