use std::collections::HashMap;

use crate::api::not_found;
use crate::auth::auth::AuthUser;
use crate::ojt::schedule::{DayScheduleDto, WorkSchedule};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use sqlx::MySqlPool;

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> actix_web::Error {
    move |e| {
        tracing::error!(error = %e, context, "Database error");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    }
}

/// The employer's current weekly schedule
#[utoipa::path(
    get,
    path = "/api/employer/schedule",
    responses(
        (status = 200, description = "Current schedule, null when unset", body = Object, example = json!({
            "status": "success",
            "data": {
                "work_schedule": {
                    "Monday": {"start": "08:00", "end": "17:00",
                               "breaks": [{"start": "12:00", "end": "13:00"}]}
                }
            }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employer"
)]
pub async fn get_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employer_id = auth.require_employer()?;

    let raw: Option<Option<String>> =
        sqlx::query_scalar("SELECT work_schedule FROM employers WHERE employer_id = ?")
            .bind(employer_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(db_error("schedule fetch"))?;

    let Some(raw) = raw else {
        return Err(not_found("Employer not found"));
    };

    // Stored text goes through the same lenient boundary as every reader,
    // so callers never see a half-broken blob.
    let schedule = WorkSchedule::parse_lenient(raw.as_deref());
    let wire: Option<serde_json::Value> = schedule
        .map(|s| serde_json::from_str(&s.to_json_string()).unwrap_or(serde_json::Value::Null));

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "data": { "work_schedule": wire }
    })))
}

/// Replace the weekly schedule. This is the only write path for it.
#[utoipa::path(
    put,
    path = "/api/employer/schedule",
    request_body(
        content = Object,
        description = "Weekday name to working-hours mapping; omit or null a day to mark it non-working",
        example = json!({
            "Monday": {"start": "08:00", "end": "17:00",
                       "breaks": [{"start": "12:00", "end": "13:00"}]},
            "Saturday": null
        })
    ),
    responses(
        (status = 200, description = "Schedule saved", body = Object, example = json!({
            "status": "success",
            "message": "Work schedule updated successfully"
        })),
        (status = 400, description = "Invariant violation", body = Object, example = json!({
            "detail": "Monday: breaks overlap"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employer"
)]
pub async fn put_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<HashMap<String, Option<DayScheduleDto>>>,
) -> actix_web::Result<impl Responder> {
    let employer_id = auth.require_employer()?;

    let schedule = match WorkSchedule::from_wire(payload.into_inner()) {
        Ok(s) => s,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(json!({ "detail": e.to_string() })));
        }
    };

    // An all-empty schedule clears the constraint entirely.
    let stored: Option<String> = if schedule.is_empty() {
        None
    } else {
        Some(schedule.to_json_string())
    };

    let exists: Option<u64> =
        sqlx::query_scalar("SELECT employer_id FROM employers WHERE employer_id = ?")
            .bind(employer_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(db_error("employer lookup"))?;

    if exists.is_none() {
        return Err(not_found("Employer not found"));
    }

    sqlx::query("UPDATE employers SET work_schedule = ? WHERE employer_id = ?")
        .bind(&stored)
        .bind(employer_id)
        .execute(pool.get_ref())
        .await
        .map_err(db_error("schedule update"))?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Work schedule updated successfully"
    })))
}
