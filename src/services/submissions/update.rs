use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{SubmissionService, load_markable_submission};
use crate::models::common::response::storage_error_response;
use crate::models::submissions::requests::{
    UpdateSubmissionMarkRequest, UpdateSubmissionRequest, UpdateSubmissionStatusRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::assessments::{check_manage_permission, current_marker};
use crate::utils::is_pdf;

pub async fn update_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
    update_request: UpdateSubmissionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    // 编辑学生信息仅限考核的管理者
    let (_, assessment) = match load_markable_submission(&storage, request, submission_id).await {
        Ok(loaded) => loaded,
        Err(resp) => return Ok(resp),
    };
    let marker = match current_marker(request) {
        Ok(marker) => marker,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = check_manage_permission(&marker, &assessment) {
        return Ok(resp);
    }

    if let Some(pdf) = &update_request.submission_pdf
        && !is_pdf(pdf)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileTypeNotAllowed,
            "Submission must be a PDF document",
        )));
    }

    match storage.update_submission(submission_id, update_request).await {
        Ok(()) => {
            info!("Submission {} updated by {}", submission_id, marker.marker_email);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Submission updated successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::SubmissionNotFound,
            ErrorCode::SubmissionUpdateFailed,
        )),
    }
}

pub async fn update_status(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
    update_request: UpdateSubmissionStatusRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(resp) = load_markable_submission(&storage, request, submission_id).await {
        return Ok(resp);
    }

    let status = update_request.submission_status;
    match storage.update_submission_status(submission_id, status).await {
        Ok(()) => {
            info!("Submission {} status set to {}", submission_id, status);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Submission status updated successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::SubmissionNotFound,
            ErrorCode::SubmissionUpdateFailed,
        )),
    }
}

pub async fn update_mark(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
    update_request: UpdateSubmissionMarkRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(resp) = load_markable_submission(&storage, request, submission_id).await {
        return Ok(resp);
    }

    match storage
        .update_submission_mark(submission_id, update_request.submission_mark)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Submission mark updated successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::SubmissionNotFound,
            ErrorCode::SubmissionUpdateFailed,
        )),
    }
}
