pub mod assessments;

pub mod auth;

pub mod markers;

pub mod modules;

pub mod submissions;

pub use assessments::configure_assessments_routes;
pub use auth::configure_auth_routes;
pub use markers::configure_markers_routes;
pub use modules::configure_modules_routes;
pub use submissions::configure_submissions_routes;

/// 注册全部 API 路由
pub fn configure_api_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_assessments_routes)
        .configure(configure_submissions_routes)
        .configure(configure_markers_routes)
        .configure(configure_modules_routes);
}
