use crate::api::{LOG_WITH_NARRATIVE, LogRow, accepted_application, not_found, schedule_for_internship};
use crate::auth::auth::AuthUser;
use crate::model::time_log::TimeLog;
use crate::ojt::aggregate::{lifecycle_status, summarize};
use crate::ojt::hours::{WorkWindow, calculate_valid_hours};
use crate::ojt::schedule::{DaySchedule, weekday_name};
use crate::ojt::validator::validate_log;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct TaskAccomplishmentRequest {
    #[schema(example = "Fix login page bug")]
    pub tasks: Option<String>,
    #[schema(example = "Fixed the bug and added a regression test")]
    pub accomplishments: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
}

async fn log_for_date(
    pool: &MySqlPool,
    student_id: u64,
    date: NaiveDate,
) -> Result<Option<TimeLog>, sqlx::Error> {
    sqlx::query_as::<_, TimeLog>(
        r#"
        SELECT log_id, student_id, application_id, log_date, time_in, time_out,
               total_hours, status, modified_after_date, remarks, submitted_at,
               validated_at, validated_by, created_at, updated_at
        FROM time_logs
        WHERE student_id = ? AND log_date = ?
        "#,
    )
    .bind(student_id)
    .bind(date)
    .fetch_optional(pool)
    .await
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> actix_web::Error {
    move |e| {
        tracing::error!(error = %e, context, "Database error");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    }
}

/// Time-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/time-in",
    responses(
        (status = 200, description = "Time in recorded successfully", body = Object, example = json!({
            "status": "success",
            "message": "Time in recorded successfully",
            "data": {"log_id": 1, "time_in": "2026-02-02T08:01:12", "log_date": "2026-02-02"}
        })),
        (status = 400, description = "Already timed in, OJT not started, or non-working day", body = Object, example = json!({
            "detail": "Already timed in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn time_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let student_id = auth.require_student()?;

    let application = accepted_application(pool.get_ref(), student_id)
        .await
        .map_err(db_error("time-in application lookup"))?;

    let Some(application) = application else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "detail": "No accepted internship application found"
        })));
    };

    let Some(start_date) = application.ojt_start_date else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "detail": "OJT start date not set"
        })));
    };

    let now = Local::now().naive_local();
    let today = now.date();

    if today < start_date {
        return Ok(HttpResponse::BadRequest().json(json!({
            "detail": "OJT has not started yet"
        })));
    }

    // Write-time schedule check: non-working days are rejected outright.
    let schedule = schedule_for_internship(pool.get_ref(), application.internship_id)
        .await
        .map_err(db_error("time-in schedule lookup"))?;

    if let Some(schedule) = &schedule {
        if !schedule.is_working_day(today.weekday()) {
            return Ok(HttpResponse::BadRequest().json(json!({
                "detail": format!(
                    "Today ({}) is not a working day for this company.",
                    weekday_name(today.weekday())
                )
            })));
        }
    }

    let result = sqlx::query(
        r#"
        INSERT INTO time_logs (student_id, application_id, log_date, time_in, status)
        VALUES (?, ?, ?, ?, 'incomplete')
        "#,
    )
    .bind(student_id)
    .bind(application.application_id)
    .bind(today)
    .bind(now)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": "Time in recorded successfully",
            "data": {
                "log_id": res.last_insert_id(),
                "time_in": now.format("%Y-%m-%dT%H:%M:%S").to_string(),
                "log_date": today
            }
        }))),
        Err(e) => {
            // The unique key on (student_id, log_date) makes concurrent
            // double time-in safe; both racers see the same answer.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "detail": "Already timed in today"
                    })));
                }
            }

            tracing::error!(error = %e, student_id, "Time-in failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Time-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/time-out",
    responses(
        (status = 200, description = "Time out recorded successfully", body = Object, example = json!({
            "status": "success",
            "message": "Time out recorded successfully",
            "data": {
                "log_id": 1,
                "time_in": "2026-02-02T08:01:12",
                "time_out": "2026-02-02T17:05:40",
                "total_hours": 8.0,
                "log_date": "2026-02-02"
            }
        })),
        (status = 400, description = "No time in record, or already timed out", body = Object, example = json!({
            "detail": "Already timed out today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn time_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let student_id = auth.require_student()?;

    let now = Local::now().naive_local();
    let today = now.date();

    let log = log_for_date(pool.get_ref(), student_id, today)
        .await
        .map_err(db_error("time-out log lookup"))?;

    let Some(log) = log else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "detail": "No time in record found for today"
        })));
    };

    if let Err(reason) = log.can_time_out() {
        return Ok(HttpResponse::BadRequest().json(json!({ "detail": reason })));
    }
    let Some(time_in) = log.time_in else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "detail": "Please time in first"
        })));
    };

    // Billable hours only inside the employer's window for today, or the
    // standard 7-12/1-5 window when no schedule constrains the day.
    let schedule = schedule_for_internship(pool.get_ref(), log.application_id)
        .await
        .map_err(db_error("time-out schedule lookup"))?;

    let window = schedule
        .as_ref()
        .and_then(|s| s.day(today.weekday()))
        .map(DaySchedule::window)
        .unwrap_or_else(WorkWindow::standard);

    let total_hours = calculate_valid_hours(time_in, now, &window);

    sqlx::query(
        r#"
        UPDATE time_logs
        SET time_out = ?, total_hours = ?, status = 'complete', updated_at = NOW()
        WHERE log_id = ?
        "#,
    )
    .bind(now)
    .bind(total_hours)
    .bind(log.log_id)
    .execute(pool.get_ref())
    .await
    .map_err(db_error("time-out update"))?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Time out recorded successfully",
        "data": {
            "log_id": log.log_id,
            "time_in": time_in.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "time_out": now.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "total_hours": total_hours,
            "log_date": today
        }
    })))
}

/// Save tasks/accomplishments for today
#[utoipa::path(
    post,
    path = "/api/attendance/save-accomplishments",
    request_body = TaskAccomplishmentRequest,
    responses(
        (status = 200, description = "Narrative saved", body = Object, example = json!({
            "status": "success",
            "message": "Tasks and accomplishments saved successfully",
            "data": {"accomplishment_id": 1, "tasks": "...", "accomplishments": "...", "log_date": "2026-02-02"}
        })),
        (status = 400, description = "No time in yet", body = Object, example = json!({
            "detail": "Please time in first before saving accomplishments"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn save_accomplishments(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<TaskAccomplishmentRequest>,
) -> actix_web::Result<impl Responder> {
    let student_id = auth.require_student()?;
    let today = Local::now().date_naive();

    let log = log_for_date(pool.get_ref(), student_id, today)
        .await
        .map_err(db_error("accomplishment log lookup"))?;

    let Some(log) = log.filter(|l| l.time_in.is_some()) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "detail": "Please time in first before saving accomplishments"
        })));
    };

    let existing: Option<u64> =
        sqlx::query_scalar("SELECT accomplishment_id FROM daily_accomplishments WHERE log_id = ?")
            .bind(log.log_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(db_error("accomplishment lookup"))?;

    let accomplishment_id = match existing {
        Some(id) => {
            sqlx::query(
                r#"
                UPDATE daily_accomplishments
                SET tasks = ?, accomplishments = ?, updated_at = NOW()
                WHERE accomplishment_id = ?
                "#,
            )
            .bind(&payload.tasks)
            .bind(&payload.accomplishments)
            .bind(id)
            .execute(pool.get_ref())
            .await
            .map_err(db_error("accomplishment update"))?;
            id
        }
        None => {
            let res = sqlx::query(
                r#"
                INSERT INTO daily_accomplishments (log_id, student_id, log_date, tasks, accomplishments)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(log.log_id)
            .bind(student_id)
            .bind(today)
            .bind(&payload.tasks)
            .bind(&payload.accomplishments)
            .execute(pool.get_ref())
            .await
            .map_err(db_error("accomplishment insert"))?;
            res.last_insert_id()
        }
    };

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Tasks and accomplishments saved successfully",
        "data": {
            "accomplishment_id": accomplishment_id,
            "tasks": payload.tasks,
            "accomplishments": payload.accomplishments,
            "log_date": today
        }
    })))
}

/// Submit today's record for supervisor validation
#[utoipa::path(
    post,
    path = "/api/attendance/submit",
    responses(
        (status = 200, description = "Record submitted", body = Object, example = json!({
            "status": "success",
            "message": "Today's record submitted successfully",
            "data": {"log_id": 1, "submitted_at": "2026-02-02T17:10:00"}
        })),
        (status = 400, description = "Incomplete record", body = Object, example = json!({
            "detail": "Please fill in both task and accomplishment before submitting"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn submit_today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let student_id = auth.require_student()?;
    let now = Local::now().naive_local();
    let today = now.date();

    let log = log_for_date(pool.get_ref(), student_id, today)
        .await
        .map_err(db_error("submit log lookup"))?;

    let Some(log) = log else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "detail": "No record found for today"
        })));
    };

    let narrative: Option<(Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT tasks, accomplishments FROM daily_accomplishments WHERE log_id = ?",
    )
    .bind(log.log_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(db_error("submit narrative lookup"))?;

    let (tasks, accomplishments) = narrative.unwrap_or((None, None));

    if let Err(reason) = log.can_submit(tasks.as_deref(), accomplishments.as_deref()) {
        return Ok(HttpResponse::BadRequest().json(json!({ "detail": reason })));
    }

    sqlx::query(
        r#"
        UPDATE time_logs
        SET status = 'submitted', submitted_at = ?, updated_at = NOW()
        WHERE log_id = ?
        "#,
    )
    .bind(now)
    .bind(log.log_id)
    .execute(pool.get_ref())
    .await
    .map_err(db_error("submit update"))?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Today's record submitted successfully",
        "data": {
            "log_id": log.log_id,
            "submitted_at": now.format("%Y-%m-%dT%H:%M:%S").to_string()
        }
    })))
}

/// Today's log and narrative
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's attendance state", body = Object, example = json!({
            "status": "success",
            "data": {
                "log_id": 1,
                "has_timed_in": true,
                "has_timed_out": false,
                "time_in": "2026-02-02T08:01:12",
                "time_out": null,
                "total_hours": 0,
                "status": "incomplete",
                "tasks": null,
                "accomplishments": null
            }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let student_id = auth.require_student()?;
    let today = Local::now().date_naive();

    let sql = format!("{} WHERE t.student_id = ? AND t.log_date = ?", LOG_WITH_NARRATIVE);
    let row: Option<LogRow> = sqlx::query_as(&sql)
        .bind(student_id)
        .bind(today)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(db_error("today lookup"))?;

    let Some(row) = row else {
        return Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "data": {
                "has_timed_in": false,
                "time_in": null,
                "time_out": null,
                "total_hours": 0,
                "tasks": null,
                "accomplishments": null
            }
        })));
    };

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "data": {
            "log_id": row.log.log_id,
            "has_timed_in": row.log.time_in.is_some(),
            "has_timed_out": row.log.time_out.is_some(),
            "time_in": row.log.time_in,
            "time_out": row.log.time_out,
            "total_hours": row.log.total_hours.unwrap_or(Decimal::ZERO),
            "status": row.log.status,
            "submitted_at": row.log.submitted_at,
            "tasks": row.tasks,
            "accomplishments": row.accomplishments
        }
    })))
}

/// All logs with validation warnings and aggregate totals
#[utoipa::path(
    get,
    path = "/api/attendance/logs",
    responses(
        (status = 200, description = "All logs plus totals", body = Object, example = json!({
            "status": "success",
            "data": {
                "logs": [{
                    "log_id": 1,
                    "log_date": "2026-02-02",
                    "time_in": "2026-02-02T08:01:12",
                    "time_out": "2026-02-02T17:05:40",
                    "total_hours": 8.0,
                    "status": "complete",
                    "tasks": "...",
                    "accomplishments": "...",
                    "validation_warning": null
                }],
                "total_hours": 8.0,
                "total_days": 1
            }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn logs(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let student_id = auth.require_student()?;

    let application = accepted_application(pool.get_ref(), student_id)
        .await
        .map_err(db_error("logs application lookup"))?;

    let schedule = match &application {
        Some(app) => schedule_for_internship(pool.get_ref(), app.internship_id)
            .await
            .map_err(db_error("logs schedule lookup"))?,
        None => None,
    };

    let sql = format!(
        "{} WHERE t.student_id = ? ORDER BY t.log_date DESC",
        LOG_WITH_NARRATIVE
    );
    let rows: Vec<LogRow> = sqlx::query_as(&sql)
        .bind(student_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(db_error("logs fetch"))?;

    let logs_data: Vec<_> = rows
        .iter()
        .map(|row| {
            let warning = validate_log(row.log.time_in, row.log.time_out, schedule.as_ref());
            json!({
                "log_id": row.log.log_id,
                "log_date": row.log.log_date,
                "time_in": row.log.time_in,
                "time_out": row.log.time_out,
                "total_hours": row.log.total_hours.unwrap_or(Decimal::ZERO),
                "status": row.log.status,
                "modified_after_date": row.log.modified_after_date,
                "tasks": row.tasks,
                "accomplishments": row.accomplishments,
                "validation_warning": warning
            })
        })
        .collect();

    let plain: Vec<TimeLog> = rows.iter().map(|r| r.log.clone()).collect();
    let summary = summarize(&plain, schedule.as_ref());

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "data": {
            "logs": logs_data,
            "total_hours": summary.total_hours,
            "total_days": summary.valid_days
        }
    })))
}

/// Paginated attendance history
#[utoipa::path(
    get,
    path = "/api/attendance/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Paginated log list", body = Object, example = json!({
            "status": "success",
            "data": [],
            "pagination": {"page": 1, "per_page": 10, "total_records": 0, "total_pages": 0}
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let student_id = auth.require_student()?;

    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM time_logs WHERE student_id = ?")
        .bind(student_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(db_error("history count"))?;

    let sql = format!(
        "{} WHERE t.student_id = ? ORDER BY t.log_date DESC LIMIT ? OFFSET ?",
        LOG_WITH_NARRATIVE
    );
    let rows: Vec<LogRow> = sqlx::query_as(&sql)
        .bind(student_id)
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(db_error("history fetch"))?;

    let data: Vec<_> = rows
        .iter()
        .map(|row| {
            json!({
                "log_id": row.log.log_id,
                "log_date": row.log.log_date,
                "time_in": row.log.time_in,
                "time_out": row.log.time_out,
                "total_hours": row.log.total_hours.unwrap_or(Decimal::ZERO),
                "status": row.log.status,
                "submitted_at": row.log.submitted_at,
                "tasks": row.tasks,
                "accomplishments": row.accomplishments
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "data": data,
        "pagination": {
            "page": page,
            "per_page": per_page,
            "total_records": total,
            "total_pages": (total + per_page as i64 - 1) / per_page as i64
        }
    })))
}

/// Valid-hour total, target, and OJT lifecycle status
#[utoipa::path(
    get,
    path = "/api/attendance/progress",
    responses(
        (status = 200, description = "Progress against the required hours", body = Object, example = json!({
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
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn progress(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let student_id = auth.require_student()?;

    let summary = student_progress(pool.get_ref(), student_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "data": summary
    })))
}

/// Shared by the student- and supervisor-facing progress endpoints.
pub(crate) async fn student_progress(
    pool: &MySqlPool,
    student_id: u64,
) -> actix_web::Result<serde_json::Value> {
    let required_hours: Option<Decimal> =
        sqlx::query_scalar("SELECT required_hours FROM students WHERE student_id = ?")
            .bind(student_id)
            .fetch_optional(pool)
            .await
            .map_err(db_error("progress student lookup"))?;

    let Some(required_hours) = required_hours else {
        return Err(not_found("Student not found"));
    };

    let application = accepted_application(pool, student_id)
        .await
        .map_err(db_error("progress application lookup"))?;

    let schedule = match &application {
        Some(app) => schedule_for_internship(pool, app.internship_id)
            .await
            .map_err(db_error("progress schedule lookup"))?,
        None => None,
    };

    let logs: Vec<TimeLog> = sqlx::query_as(
        r#"
        SELECT log_id, student_id, application_id, log_date, time_in, time_out,
               total_hours, status, modified_after_date, remarks, submitted_at,
               validated_at, validated_by, created_at, updated_at
        FROM time_logs
        WHERE student_id = ?
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
    .map_err(db_error("progress logs fetch"))?;

    let summary = summarize(&logs, schedule.as_ref());
    let ojt_status = lifecycle_status(
        application.as_ref().and_then(|a| a.ojt_start_date),
        Local::now().date_naive(),
        summary.total_hours,
        required_hours,
    );

    Ok(json!({
        "total_hours": summary.total_hours,
        "required_hours": required_hours,
        "valid_days": summary.valid_days,
        "flagged_logs": summary.flagged_logs,
        "ojt_status": ojt_status
    }))
}
