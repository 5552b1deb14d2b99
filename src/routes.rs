use crate::{
    api::{attendance, envelope::bad_request},
    attendance::store::{AttendanceRepository, mysql::MySqlAttendanceStore},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{Scope, middleware::from_fn, web};
use anyhow::Context;

pub type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter allowing `requests_per_min`, bursting up to the same amount.
pub fn limiter_config(requests_per_min: u32) -> anyhow::Result<LimiterConfig> {
    let per_ms = 60_000 / u64::from(requests_per_min.max(1));

    GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("Invalid rate limiter configuration")
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiter: &LimiterConfig) {
    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(Governor::new(limiter)) // rate limiting
            .service(attendance_scope::<MySqlAttendanceStore>()),
    );
}

/// `/attendance` routes over store `S`. Body, path and query parse errors
/// come back as a 400 envelope.
pub fn attendance_scope<S: AttendanceRepository + 'static>() -> Scope {
    web::scope("/attendance")
        .app_data(web::JsonConfig::default().error_handler(|err, _| bad_request(err.to_string())))
        .app_data(web::QueryConfig::default().error_handler(|err, _| bad_request(err.to_string())))
        .app_data(web::PathConfig::default().error_handler(|err, _| bad_request(err.to_string())))
        // /attendance
        .service(
            web::resource("")
                .route(web::post().to(attendance::create_attendance::<S>))
                .route(web::get().to(attendance::list_attendance::<S>)),
        )
        // /attendance/check-in
        .service(web::resource("/check-in").route(web::post().to(attendance::check_in::<S>)))
        // /attendance/check-out
        .service(web::resource("/check-out").route(web::post().to(attendance::check_out::<S>)))
        // /attendance/{id}
        .service(
            web::resource("/{id}")
                .route(web::get().to(attendance::get_attendance::<S>))
                .route(web::put().to(attendance::update_attendance::<S>))
                .route(web::delete().to(attendance::delete_attendance::<S>)),
        )
}
