use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assessments::requests::{
    AssessmentListQuery, CreateAssessmentRequest, UpdateAssessmentRequest, UpdateTotalMarkRequest,
};
use crate::models::markers::entities::MarkerRole;
use crate::services::AssessmentService;
use crate::utils::SafeIDI64;

// 懒加载的全局 ASSESSMENT_SERVICE 实例
static ASSESSMENT_SERVICE: Lazy<AssessmentService> = Lazy::new(AssessmentService::new_lazy);

// HTTP处理程序
pub async fn list_assessments(
    req: HttpRequest,
    query: web::Query<AssessmentListQuery>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .list_assessments(&req, query.into_inner())
        .await
}

pub async fn list_all_assessments(req: HttpRequest) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.list_all_assessments(&req).await
}

pub async fn create_assessment(
    req: HttpRequest,
    assessment_data: web::Json<CreateAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .create_assessment(&req, assessment_data.into_inner())
        .await
}

pub async fn get_assessment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.get_assessment(&req, id.0).await
}

pub async fn update_assessment(
    req: HttpRequest,
    id: SafeIDI64,
    update_data: web::Json<UpdateAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .update_assessment(&req, id.0, update_data.into_inner())
        .await
}

pub async fn delete_assessment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.delete_assessment(&req, id.0).await
}

pub async fn update_total_mark(
    req: HttpRequest,
    id: SafeIDI64,
    update_data: web::Json<UpdateTotalMarkRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .update_total_mark(&req, id.0, update_data.into_inner())
        .await
}

pub async fn get_memorandum(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.get_memorandum(&req, id.0).await
}

pub async fn recalculate(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.recalculate(&req, id.0).await
}

pub async fn list_submissions(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.list_submissions(&req, id.0).await
}

// 配置路由
pub fn configure_assessments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assessments")
            .wrap(middlewares::RequireJWT)
            .service(
                // 阅卷人查询自己参与的考核，讲师创建考核
                web::resource("")
                    .route(web::get().to(list_assessments))
                    .route(
                        web::post()
                            .to(create_assessment)
                            .wrap(middlewares::RequireRole::new_any(MarkerRole::lecturer_roles())),
                    ),
            )
            .service(
                // 必须先于 /{id} 注册
                web::resource("/all").route(
                    web::get()
                        .to(list_all_assessments)
                        .wrap(middlewares::RequireRole::new_any(MarkerRole::admin_roles())),
                ),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_assessment))
                    .route(
                        web::put()
                            .to(update_assessment)
                            .wrap(middlewares::RequireRole::new_any(MarkerRole::lecturer_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_assessment)
                            .wrap(middlewares::RequireRole::new_any(MarkerRole::lecturer_roles())),
                    ),
            )
            .service(
                web::resource("/{id}/total-mark").route(
                    web::put()
                        .to(update_total_mark)
                        .wrap(middlewares::RequireRole::new_any(MarkerRole::lecturer_roles())),
                ),
            )
            .service(
                web::resource("/{id}/recalculate").route(
                    web::post()
                        .to(recalculate)
                        .wrap(middlewares::RequireRole::new_any(MarkerRole::lecturer_roles())),
                ),
            )
            .route("/{id}/memorandum", web::get().to(get_memorandum))
            .route("/{id}/submissions", web::get().to(list_submissions)),
    );
}
