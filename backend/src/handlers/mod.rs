use actix_web::web;

pub mod habits;
pub mod progress;
pub mod reset;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(habits::configure)
            .configure(progress::configure)
            .configure(reset::configure),
    );
}
