use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct TraineeSupervisor {
    pub supervisor_id: u64,
    pub user_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Links a supervisor to a student. Only an `active` assignment grants
/// the supervisor write access to that student's records.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct SupervisorAssignment {
    pub assignment_id: u64,
    pub supervisor_id: u64,
    pub student_id: u64,
    pub status: String,
}
