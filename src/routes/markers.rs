use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::markers::entities::MarkerRole;
use crate::models::markers::requests::{CreateMarkerRequest, UpdateMarkerRequest};
use crate::services::MarkerService;
use crate::utils::SafeEmail;

// 懒加载的全局 MARKER_SERVICE 实例
static MARKER_SERVICE: Lazy<MarkerService> = Lazy::new(MarkerService::new_lazy);

pub async fn list_markers(req: HttpRequest) -> ActixResult<HttpResponse> {
    MARKER_SERVICE.list_markers(&req, &[]).await
}

// 讲师与主持人（管理员也可担任主持人）
pub async fn list_lecturers(req: HttpRequest) -> ActixResult<HttpResponse> {
    MARKER_SERVICE
        .list_markers(&req, &[MarkerRole::Lecturer, MarkerRole::Admin])
        .await
}

pub async fn list_demis(req: HttpRequest) -> ActixResult<HttpResponse> {
    MARKER_SERVICE.list_markers(&req, &[MarkerRole::Demi]).await
}

pub async fn add_lecturer(
    req: HttpRequest,
    marker_data: web::Json<CreateMarkerRequest>,
) -> ActixResult<HttpResponse> {
    MARKER_SERVICE
        .create_marker(&req, MarkerRole::Lecturer, marker_data.into_inner())
        .await
}

pub async fn add_demi(
    req: HttpRequest,
    marker_data: web::Json<CreateMarkerRequest>,
) -> ActixResult<HttpResponse> {
    MARKER_SERVICE
        .create_marker(&req, MarkerRole::Demi, marker_data.into_inner())
        .await
}

pub async fn update_marker(
    req: HttpRequest,
    email: SafeEmail,
    update_data: web::Json<UpdateMarkerRequest>,
) -> ActixResult<HttpResponse> {
    MARKER_SERVICE
        .update_marker(&req, email.0, update_data.into_inner())
        .await
}

pub async fn delete_marker(req: HttpRequest, email: SafeEmail) -> ActixResult<HttpResponse> {
    MARKER_SERVICE.delete_marker(&req, email.0).await
}

// 配置路由
pub fn configure_markers_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/markers")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(
                    web::get()
                        .to(list_markers)
                        .wrap(middlewares::RequireRole::new_any(MarkerRole::admin_roles())),
                ),
            )
            .service(
                web::resource("/lecturers")
                    .route(
                        web::get()
                            .to(list_lecturers)
                            .wrap(middlewares::RequireRole::new_any(MarkerRole::lecturer_roles())),
                    )
                    .route(
                        web::post()
                            .to(add_lecturer)
                            .wrap(middlewares::RequireRole::new_any(MarkerRole::admin_roles())),
                    ),
            )
            .service(
                web::resource("/moderators").route(
                    web::get()
                        .to(list_lecturers)
                        .wrap(middlewares::RequireRole::new_any(MarkerRole::lecturer_roles())),
                ),
            )
            .service(
                web::resource("/demis")
                    .route(
                        web::get()
                            .to(list_demis)
                            .wrap(middlewares::RequireRole::new_any(MarkerRole::lecturer_roles())),
                    )
                    .route(
                        web::post()
                            .to(add_demi)
                            .wrap(middlewares::RequireRole::new_any(MarkerRole::lecturer_roles())),
                    ),
            )
            .service(
                web::resource("/{email}")
                    .wrap(middlewares::RequireRole::new_any(MarkerRole::admin_roles()))
                    .route(web::put().to(update_marker))
                    .route(web::delete().to(delete_marker)),
            ),
    );
}
