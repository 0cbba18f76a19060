use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::markers::entities::MarkerRole;
use crate::models::questions::requests::SetQuestionMarkRequest;
use crate::models::submissions::requests::{
    CreateSubmissionRequest, UpdateSubmissionMarkRequest, UpdateSubmissionRequest,
    UpdateSubmissionStatusRequest,
};
use crate::services::SubmissionService;
use crate::utils::SafeIDI64;

// 懒加载的全局 SUBMISSION_SERVICE 实例
static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);

pub async fn create_submission(
    req: HttpRequest,
    submission_data: web::Json<CreateSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .create_submission(&req, submission_data.into_inner())
        .await
}

pub async fn update_submission(
    req: HttpRequest,
    id: SafeIDI64,
    update_data: web::Json<UpdateSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .update_submission(&req, id.0, update_data.into_inner())
        .await
}

pub async fn update_status(
    req: HttpRequest,
    id: SafeIDI64,
    update_data: web::Json<UpdateSubmissionStatusRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .update_status(&req, id.0, update_data.into_inner())
        .await
}

pub async fn update_mark(
    req: HttpRequest,
    id: SafeIDI64,
    update_data: web::Json<UpdateSubmissionMarkRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .update_mark(&req, id.0, update_data.into_inner())
        .await
}

pub async fn get_submission_pdf(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.get_submission_pdf(&req, id.0).await
}

pub async fn get_marked_pdf(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.get_marked_pdf(&req, id.0).await
}

pub async fn upload_marked_pdf(
    req: HttpRequest,
    id: SafeIDI64,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .upload_marked_pdf(&req, id.0, payload)
        .await
}

pub async fn list_question_marks(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.list_question_marks(&req, id.0).await
}

pub async fn set_question_mark(
    req: HttpRequest,
    id: SafeIDI64,
    question_data: web::Json<SetQuestionMarkRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .set_question_mark(&req, id.0, question_data.into_inner())
        .await
}

// 配置路由
pub fn configure_submissions_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/submissions")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(
                    web::post()
                        .to(create_submission)
                        .wrap(middlewares::RequireRole::new_any(MarkerRole::lecturer_roles())),
                ),
            )
            .service(
                web::resource("/{id}").route(
                    web::put()
                        .to(update_submission)
                        .wrap(middlewares::RequireRole::new_any(MarkerRole::lecturer_roles())),
                ),
            )
            // 名单中的阅卷人均可批改
            .route("/{id}/status", web::put().to(update_status))
            .route("/{id}/mark", web::put().to(update_mark))
            .route("/{id}/pdf", web::get().to(get_submission_pdf))
            .service(
                web::resource("/{id}/marked-pdf")
                    .route(web::get().to(get_marked_pdf))
                    .route(web::put().to(upload_marked_pdf)),
            )
            .service(
                web::resource("/{id}/questions")
                    .route(web::get().to(list_question_marks))
                    .route(web::put().to(set_question_mark)),
            ),
    );
}
