use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};

use super::AssessmentService;
use crate::models::common::response::storage_error_response;
use crate::models::{ApiResponse, ErrorCode};

pub async fn get_assessment(
    service: &AssessmentService,
    request: &HttpRequest,
    assessment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_assessment_by_id(assessment_id).await {
        Ok(Some(assessment)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            assessment,
            "Assessment retrieved successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssessmentNotFound,
            "Assessment not found",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::AssessmentNotFound,
            ErrorCode::InternalServerError,
        )),
    }
}

pub async fn get_memorandum(
    service: &AssessmentService,
    request: &HttpRequest,
    assessment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_memorandum(assessment_id).await {
        Ok(Some(pdf)) => Ok(HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, "application/pdf"))
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"memorandum-{assessment_id}.pdf\""),
            ))
            .body(pdf)),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::MemorandumNotFound,
            "Assessment has no memorandum",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::AssessmentNotFound,
            ErrorCode::InternalServerError,
        )),
    }
}
