use crate::api::attendance::TaskAccomplishmentRequest;
use crate::api::supervisor::RecordUpdateRequest;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OJT Management System API",
        version = "1.0.0",
        description = r#"
## Internship / On-the-Job-Training (OJT) Management System

This API powers the attendance and hours-validation core of a multi-portal
OJT management backend.

### Key Features
- **Daily Attendance**
  - Student time-in / time-out with per-day uniqueness
  - Billable hours computed inside the employer's working windows only
- **Daily Accomplishments**
  - Task and accomplishment narrative per OJT day, with submission workflow
- **Supervisor Validation**
  - Record review, approval/rejection, and post-hoc edits with audit flags
- **Progress Tracking**
  - Valid-hour totals against the required target (default 486 hours)
- **Work Schedules**
  - Typed, validated weekly schedules with break periods per employer

### Security
Endpoints are protected using **JWT Bearer authentication**. Student,
supervisor, and employer operations are gated by role and, for
supervisors, by an active student assignment.

### Response Format
Success responses wrap their payload as `{"status": "success", "data": {...}}`;
errors carry a JSON `detail` message.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::time_in,
        crate::api::attendance::time_out,
        crate::api::attendance::save_accomplishments,
        crate::api::attendance::submit_today,
        crate::api::attendance::today,
        crate::api::attendance::logs,
        crate::api::attendance::history,
        crate::api::attendance::progress,

        crate::api::supervisor::student_records,
        crate::api::supervisor::validate_record,
        crate::api::supervisor::update_record,
        crate::api::supervisor::student_progress,

        crate::api::employer::get_schedule,
        crate::api::employer::put_schedule
    ),
    components(
        schemas(
            TaskAccomplishmentRequest,
            RecordUpdateRequest
        )
    ),
    tags(
        (name = "Attendance", description = "Student time tracking APIs"),
        (name = "Supervisor", description = "Record validation and editing APIs"),
        (name = "Employer", description = "Work schedule APIs"),
    )
)]
pub struct ApiDoc;
