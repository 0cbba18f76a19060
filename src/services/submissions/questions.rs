use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{SubmissionService, load_markable_submission};
use crate::models::common::response::storage_error_response;
use crate::models::questions::requests::SetQuestionMarkRequest;
use crate::models::questions::responses::QuestionMarkListResponse;
use crate::models::{ApiResponse, ErrorCode};

pub async fn list_question_marks(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(resp) = load_markable_submission(&storage, request, submission_id).await {
        return Ok(resp);
    }

    match storage.list_question_marks(submission_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            QuestionMarkListResponse { items },
            "Question marks retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::QuestionMarksNotFound,
            ErrorCode::InternalServerError,
        )),
    }
}

pub async fn set_question_mark(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
    set_request: SetQuestionMarkRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(resp) = load_markable_submission(&storage, request, submission_id).await {
        return Ok(resp);
    }

    match storage
        .set_question_mark(
            submission_id,
            &set_request.question_text,
            set_request.mark_allocation,
        )
        .await
    {
        Ok(question) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            question,
            "Question mark saved",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::SubmissionNotFound,
            ErrorCode::SubmissionUpdateFailed,
        )),
    }
}
