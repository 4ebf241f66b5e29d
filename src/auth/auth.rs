use crate::{model::role::Role, models::Claims};
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};
use jsonwebtoken::decode;
use jsonwebtoken::{DecodingKey, Validation};
use crate::config::Config;

pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to a student record
    pub student_id: Option<u64>,
    /// Present only if this user is linked to a trainee supervisor record
    pub supervisor_id: Option<u64>,
    /// Present only if this user is linked to an employer record
    pub employer_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(
                    actix_web::error::ErrorInternalServerError("Config missing"),
                ))
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        let role = match Role::from_id(data.claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: data.claims.user_id,
            username: data.claims.sub,
            role,
            student_id: data.claims.student_id,
            supervisor_id: data.claims.supervisor_id,
            employer_id: data.claims.employer_id,
        }))
    }
}

impl AuthUser {
    /// Student-only operation; returns the caller's student id.
    pub fn require_student(&self) -> actix_web::Result<u64> {
        if self.role != Role::Student {
            return Err(actix_web::error::ErrorForbidden("Only students can do this"));
        }
        self.student_id
            .ok_or_else(|| actix_web::error::ErrorNotFound("Student profile not found"))
    }

    /// Supervisor-only operation; returns the caller's supervisor id.
    /// Per-student access still requires an active assignment check.
    pub fn require_supervisor(&self) -> actix_web::Result<u64> {
        if self.role != Role::Supervisor {
            return Err(actix_web::error::ErrorForbidden(
                "Access denied. Supervisor role required.",
            ));
        }
        self.supervisor_id
            .ok_or_else(|| actix_web::error::ErrorNotFound("Supervisor profile not found"))
    }

    /// Employer-only operation; returns the caller's employer id.
    pub fn require_employer(&self) -> actix_web::Result<u64> {
        if self.role != Role::Employer {
            return Err(actix_web::error::ErrorForbidden(
                "Access denied. Employer role required.",
            ));
        }
        self.employer_id
            .ok_or_else(|| actix_web::error::ErrorNotFound("Employer profile not found"))
    }
}
