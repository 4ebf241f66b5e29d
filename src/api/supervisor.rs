use crate::api::{LOG_WITH_NARRATIVE, LogRow, forbidden, not_found, schedule_for_internship};
use crate::auth::auth::AuthUser;
use crate::model::time_log::{LogStatus, TimeLog};
use crate::ojt::hours::{WorkWindow, calculate_valid_hours};
use crate::ojt::schedule::DaySchedule;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
pub struct RecordFilter {
    /// Only records on or after this date (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// Only records on or before this date (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams)]
pub struct ValidateQuery {
    /// approved, rejected, or complete
    pub validation_status: String,
    pub remarks: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct RecordUpdateRequest {
    /// ISO datetime, e.g. "2026-02-02T08:00:00"
    pub time_in: Option<String>,
    pub time_out: Option<String>,
    pub tasks: Option<String>,
    pub accomplishments: Option<String>,
    pub remarks: Option<String>,
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> actix_web::Error {
    move |e| {
        tracing::error!(error = %e, context, "Database error");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    }
}

/// Supervisors only touch students they hold an active assignment for.
async fn ensure_assigned(
    pool: &MySqlPool,
    supervisor_id: u64,
    student_id: u64,
) -> actix_web::Result<()> {
    let assigned: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT 1
        FROM supervisor_assignments
        WHERE student_id = ? AND supervisor_id = ? AND status = 'active'
        LIMIT 1
        "#,
    )
    .bind(student_id)
    .bind(supervisor_id)
    .fetch_optional(pool)
    .await
    .map_err(db_error("assignment check"))?;

    if assigned.is_none() {
        return Err(forbidden("You are not assigned to this student"));
    }
    Ok(())
}

async fn fetch_log(pool: &MySqlPool, log_id: u64) -> actix_web::Result<TimeLog> {
    sqlx::query_as::<_, TimeLog>(
        r#"
        SELECT log_id, student_id, application_id, log_date, time_in, time_out,
               total_hours, status, modified_after_date, remarks, submitted_at,
               validated_at, validated_by, created_at, updated_at
        FROM time_logs
        WHERE log_id = ?
        "#,
    )
    .bind(log_id)
    .fetch_optional(pool)
    .await
    .map_err(db_error("record lookup"))?
    .ok_or_else(|| not_found("Record not found"))
}

fn parse_iso_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .ok()
}

/// A student's full record list for review
#[utoipa::path(
    get,
    path = "/api/supervisor/students/{student_id}/records",
    params(
        ("student_id" = u64, Path, description = "Student whose records to list"),
        RecordFilter
    ),
    responses(
        (status = 200, description = "Record list", body = Object, example = json!({
            "status": "success",
            "data": [{
                "log_id": 1,
                "log_date": "2026-02-02",
                "time_in": "2026-02-02T08:01:12",
                "time_out": "2026-02-02T17:05:40",
                "total_hours": 8.0,
                "status": "submitted",
                "tasks": "...",
                "accomplishments": "...",
                "remarks": null,
                "modified_after_date": false
            }]
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not assigned to this student"),
        (status = 404, description = "Student not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Supervisor"
)]
pub async fn student_records(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<RecordFilter>,
) -> actix_web::Result<impl Responder> {
    let supervisor_id = auth.require_supervisor()?;
    let student_id = path.into_inner();

    let exists: Option<u64> = sqlx::query_scalar("SELECT student_id FROM students WHERE student_id = ?")
        .bind(student_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(db_error("student lookup"))?;

    if exists.is_none() {
        return Err(not_found("Student not found"));
    }

    ensure_assigned(pool.get_ref(), supervisor_id, student_id).await?;

    let mut sql = format!("{} WHERE t.student_id = ?", LOG_WITH_NARRATIVE);
    let mut date_bounds: Vec<NaiveDate> = Vec::new();

    if let Some(start) = query.start_date {
        sql.push_str(" AND t.log_date >= ?");
        date_bounds.push(start);
    }
    if let Some(end) = query.end_date {
        sql.push_str(" AND t.log_date <= ?");
        date_bounds.push(end);
    }
    sql.push_str(" ORDER BY t.log_date DESC");

    let mut q = sqlx::query_as::<_, LogRow>(&sql).bind(student_id);
    for bound in date_bounds {
        q = q.bind(bound);
    }

    let rows = q
        .fetch_all(pool.get_ref())
        .await
        .map_err(db_error("records fetch"))?;

    let data: Vec<_> = rows
        .iter()
        .map(|row| {
            json!({
                "log_id": row.log.log_id,
                "student_id": row.log.student_id,
                "log_date": row.log.log_date,
                "time_in": row.log.time_in,
                "time_out": row.log.time_out,
                "total_hours": row.log.total_hours.unwrap_or(Decimal::ZERO),
                "status": row.log.status,
                "tasks": row.tasks,
                "accomplishments": row.accomplishments,
                "remarks": row.log.remarks,
                "submitted_at": row.log.submitted_at,
                "validated_at": row.log.validated_at,
                "modified_after_date": row.log.modified_after_date
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "data": data
    })))
}

/// Validate or reject a submitted record
#[utoipa::path(
    put,
    path = "/api/supervisor/records/{record_id}/validate",
    params(
        ("record_id" = u64, Path, description = "Record to validate"),
        ValidateQuery
    ),
    responses(
        (status = 200, description = "Record validated", body = Object, example = json!({
            "status": "success",
            "message": "Record approved successfully",
            "data": {"log_id": 1, "validation_status": "complete", "validated_at": "2026-02-03T09:00:00"}
        })),
        (status = 400, description = "Bad validation status", body = Object, example = json!({
            "detail": "validation_status must be approved, rejected, or complete"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not assigned to this student"),
        (status = 404, description = "Record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Supervisor"
)]
pub async fn validate_record(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<ValidateQuery>,
) -> actix_web::Result<impl Responder> {
    let supervisor_id = auth.require_supervisor()?;
    let record_id = path.into_inner();

    // "approved" collapses to complete; only "rejected" survives as its
    // own stored status.
    let new_status = match query.validation_status.as_str() {
        "approved" | "complete" => LogStatus::Complete,
        "rejected" => LogStatus::Rejected,
        _ => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "detail": "validation_status must be approved, rejected, or complete"
            })));
        }
    };

    let log = fetch_log(pool.get_ref(), record_id).await?;
    ensure_assigned(pool.get_ref(), supervisor_id, log.student_id).await?;

    let now = Local::now().naive_local();

    sqlx::query(
        r#"
        UPDATE time_logs
        SET status = ?, validated_at = ?, validated_by = ?,
            remarks = COALESCE(?, remarks), updated_at = NOW()
        WHERE log_id = ?
        "#,
    )
    .bind(new_status)
    .bind(now)
    .bind(supervisor_id)
    .bind(&query.remarks)
    .bind(record_id)
    .execute(pool.get_ref())
    .await
    .map_err(db_error("validate update"))?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": format!("Record {} successfully", query.validation_status),
        "data": {
            "log_id": record_id,
            "validation_status": new_status,
            "validated_at": now.format("%Y-%m-%dT%H:%M:%S").to_string()
        }
    })))
}

/// Edit a record's timestamps, narrative, or remarks
#[utoipa::path(
    put,
    path = "/api/supervisor/records/{record_id}/update",
    params(("record_id" = u64, Path, description = "Record to edit")),
    request_body = RecordUpdateRequest,
    responses(
        (status = 200, description = "Record updated", body = Object, example = json!({
            "status": "success",
            "message": "Record updated successfully",
            "data": {
                "log_id": 1,
                "time_in": "2026-02-02T08:00:00",
                "time_out": "2026-02-02T17:00:00",
                "total_hours": 8.0,
                "modified_after_date": true
            }
        })),
        (status = 400, description = "Bad timestamp format", body = Object, example = json!({
            "detail": "time_in is not a valid ISO datetime"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not assigned to this student"),
        (status = 404, description = "Record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Supervisor"
)]
pub async fn update_record(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<RecordUpdateRequest>,
) -> actix_web::Result<impl Responder> {
    let supervisor_id = auth.require_supervisor()?;
    let record_id = path.into_inner();

    let log = fetch_log(pool.get_ref(), record_id).await?;
    ensure_assigned(pool.get_ref(), supervisor_id, log.student_id).await?;

    let time_in = match &payload.time_in {
        Some(raw) => match parse_iso_datetime(raw) {
            Some(dt) => Some(dt),
            None => {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "detail": "time_in is not a valid ISO datetime"
                })));
            }
        },
        None => log.time_in,
    };
    let time_out = match &payload.time_out {
        Some(raw) => match parse_iso_datetime(raw) {
            Some(dt) => Some(dt),
            None => {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "detail": "time_out is not a valid ISO datetime"
                })));
            }
        },
        None => log.time_out,
    };

    // Recompute against the employer's window whenever both ends exist.
    let total_hours = match (time_in, time_out) {
        (Some(t_in), Some(t_out)) => {
            let internship_id: Option<u64> = sqlx::query_scalar(
                "SELECT internship_id FROM internship_applications WHERE application_id = ?",
            )
            .bind(log.application_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(db_error("application lookup"))?;

            let schedule = match internship_id {
                Some(id) => schedule_for_internship(pool.get_ref(), id)
                    .await
                    .map_err(db_error("schedule lookup"))?,
                None => None,
            };

            let window = schedule
                .as_ref()
                .and_then(|s| s.day(log.log_date.weekday()))
                .map(DaySchedule::window)
                .unwrap_or_else(WorkWindow::standard);

            Some(calculate_valid_hours(t_in, t_out, &window))
        }
        _ => log.total_hours,
    };

    // Post-hoc edits are allowed but leave a mark.
    let modified_after_date =
        log.modified_after_date || log.log_date < Local::now().date_naive();

    sqlx::query(
        r#"
        UPDATE time_logs
        SET time_in = ?, time_out = ?, total_hours = ?,
            remarks = COALESCE(?, remarks), modified_after_date = ?, updated_at = NOW()
        WHERE log_id = ?
        "#,
    )
    .bind(time_in)
    .bind(time_out)
    .bind(total_hours)
    .bind(&payload.remarks)
    .bind(modified_after_date)
    .bind(record_id)
    .execute(pool.get_ref())
    .await
    .map_err(db_error("record update"))?;

    if payload.tasks.is_some() || payload.accomplishments.is_some() {
        let existing: Option<u64> = sqlx::query_scalar(
            "SELECT accomplishment_id FROM daily_accomplishments WHERE log_id = ?",
        )
        .bind(record_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(db_error("narrative lookup"))?;

        match existing {
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE daily_accomplishments
                    SET tasks = COALESCE(?, tasks),
                        accomplishments = COALESCE(?, accomplishments),
                        updated_at = NOW()
                    WHERE accomplishment_id = ?
                    "#,
                )
                .bind(&payload.tasks)
                .bind(&payload.accomplishments)
                .bind(id)
                .execute(pool.get_ref())
                .await
                .map_err(db_error("narrative update"))?;
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO daily_accomplishments (log_id, student_id, log_date, tasks, accomplishments)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(record_id)
                .bind(log.student_id)
                .bind(log.log_date)
                .bind(&payload.tasks)
                .bind(&payload.accomplishments)
                .execute(pool.get_ref())
                .await
                .map_err(db_error("narrative insert"))?;
            }
        }
    }

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Record updated successfully",
        "data": {
            "log_id": record_id,
            "time_in": time_in,
            "time_out": time_out,
            "total_hours": total_hours.unwrap_or(Decimal::ZERO),
            "modified_after_date": modified_after_date
        }
    })))
}

/// An assigned student's progress summary
#[utoipa::path(
    get,
    path = "/api/supervisor/students/{student_id}/progress",
    params(("student_id" = u64, Path, description = "Student to summarize")),
    responses(
        (status = 200, description = "Progress summary", body = Object, example = json!({
            "status": "success",
            "data": {
                "total_hours": 120.5,
                "required_hours": 486.0,
                "valid_days": 15,
                "flagged_logs": 1,
                "ojt_status": "ongoing"
            }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not assigned to this student"),
        (status = 404, description = "Student not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Supervisor"
)]
pub async fn student_progress(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let supervisor_id = auth.require_supervisor()?;
    let student_id = path.into_inner();

    ensure_assigned(pool.get_ref(), supervisor_id, student_id).await?;

    let summary = crate::api::attendance::student_progress(pool.get_ref(), student_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "data": summary
    })))
}
