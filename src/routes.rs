use crate::{
    api::{attendance, employer, supervisor},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/time-in").route(web::post().to(attendance::time_in)),
                    )
                    .service(
                        web::resource("/time-out").route(web::post().to(attendance::time_out)),
                    )
                    .service(
                        web::resource("/save-accomplishments")
                            .route(web::post().to(attendance::save_accomplishments)),
                    )
                    .service(web::resource("/submit").route(web::post().to(attendance::submit_today)))
                    .service(web::resource("/today").route(web::get().to(attendance::today)))
                    .service(web::resource("/logs").route(web::get().to(attendance::logs)))
                    .service(web::resource("/history").route(web::get().to(attendance::history)))
                    .service(web::resource("/progress").route(web::get().to(attendance::progress))),
            )
            .service(
                web::scope("/supervisor")
                    // /supervisor/students/{student_id}/records
                    .service(
                        web::resource("/students/{student_id}/records")
                            .route(web::get().to(supervisor::student_records)),
                    )
                    .service(
                        web::resource("/students/{student_id}/progress")
                            .route(web::get().to(supervisor::student_progress)),
                    )
                    .service(
                        web::resource("/records/{record_id}/validate")
                            .route(web::put().to(supervisor::validate_record)),
                    )
                    .service(
                        web::resource("/records/{record_id}/update")
                            .route(web::put().to(supervisor::update_record)),
                    ),
            )
            .service(
                web::scope("/employer").service(
                    web::resource("/schedule")
                        .route(web::get().to(employer::get_schedule))
                        .route(web::put().to(employer::put_schedule)),
                ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// API REQUEST
//  └─ Authorization: Bearer access_token
//
// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
