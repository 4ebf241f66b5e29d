pub mod attendance;
pub mod employer;
pub mod supervisor;

use actix_web::HttpResponse;
use actix_web::error::InternalError;
use serde_json::json;
use sqlx::MySqlPool;

use crate::model::application::InternshipApplication;
use crate::model::time_log::TimeLog;
use crate::ojt::schedule::WorkSchedule;

/// 404 with the JSON `detail` body every error in this API carries.
pub(crate) fn not_found(detail: &str) -> actix_web::Error {
    InternalError::from_response(
        detail.to_string(),
        HttpResponse::NotFound().json(json!({ "detail": detail })),
    )
    .into()
}

/// 403 with a JSON `detail` body.
pub(crate) fn forbidden(detail: &str) -> actix_web::Error {
    InternalError::from_response(
        detail.to_string(),
        HttpResponse::Forbidden().json(json!({ "detail": detail })),
    )
    .into()
}

/// One time log joined with its narrative row.
#[derive(sqlx::FromRow)]
pub(crate) struct LogRow {
    #[sqlx(flatten)]
    pub log: TimeLog,
    pub tasks: Option<String>,
    pub accomplishments: Option<String>,
}

pub(crate) const LOG_WITH_NARRATIVE: &str = r#"
    SELECT t.log_id, t.student_id, t.application_id, t.log_date,
           t.time_in, t.time_out, t.total_hours, t.status,
           t.modified_after_date, t.remarks, t.submitted_at,
           t.validated_at, t.validated_by, t.created_at, t.updated_at,
           a.tasks, a.accomplishments
    FROM time_logs t
    LEFT JOIN daily_accomplishments a ON a.log_id = t.log_id
"#;

/// Latest accepted application for a student, if any.
pub(crate) async fn accepted_application(
    pool: &MySqlPool,
    student_id: u64,
) -> Result<Option<InternshipApplication>, sqlx::Error> {
    sqlx::query_as::<_, InternshipApplication>(
        r#"
        SELECT application_id, student_id, internship_id, status, ojt_start_date
        FROM internship_applications
        WHERE student_id = ? AND status = 'accepted'
        ORDER BY application_id DESC
        LIMIT 1
        "#,
    )
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

/// Work schedule of the employer behind an internship. Absent employer or
/// unusable JSON both come back as `None` (no schedule constraint).
pub(crate) async fn schedule_for_internship(
    pool: &MySqlPool,
    internship_id: u64,
) -> Result<Option<WorkSchedule>, sqlx::Error> {
    let raw: Option<Option<String>> = sqlx::query_scalar(
        r#"
        SELECT e.work_schedule
        FROM internships i
        JOIN employers e ON e.employer_id = i.employer_id
        WHERE i.internship_id = ?
        "#,
    )
    .bind(internship_id)
    .fetch_optional(pool)
    .await?;

    Ok(WorkSchedule::parse_lenient(raw.flatten().as_deref()))
}
