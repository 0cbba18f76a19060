use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssessmentService, current_marker};
use crate::models::assessments::requests::AssessmentListQuery;
use crate::models::assessments::responses::AssessmentListResponse;
use crate::models::common::response::storage_error_response;
use crate::models::markers::entities::MarkerRole;
use crate::models::submissions::responses::SubmissionListResponse;
use crate::models::{ApiResponse, ErrorCode};

pub async fn list_assessments(
    service: &AssessmentService,
    request: &HttpRequest,
    query: AssessmentListQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let marker = match current_marker(request) {
        Ok(marker) => marker,
        Err(resp) => return Ok(resp),
    };

    // 只有管理员可以查询其他阅卷人的考核
    let target = match query.marker_email.map(|e| e.trim().to_string()) {
        Some(email) if !email.is_empty() && email != marker.marker_email => {
            if marker.marker_role != MarkerRole::Admin {
                return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                    ErrorCode::Forbidden,
                    "You can only list your own assessments",
                )));
            }
            email
        }
        _ => marker.marker_email,
    };

    match storage.list_assessments_for_marker(&target).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AssessmentListResponse { items },
            "Assessments retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::AssessmentNotFound,
            ErrorCode::InternalServerError,
        )),
    }
}

pub async fn list_all_assessments(
    service: &AssessmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_all_assessments().await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AssessmentListResponse { items },
            "Assessments retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::AssessmentNotFound,
            ErrorCode::InternalServerError,
        )),
    }
}

pub async fn list_submissions(
    service: &AssessmentService,
    request: &HttpRequest,
    assessment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_assessment_by_id(assessment_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssessmentNotFound,
                "Assessment not found",
            )));
        }
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::AssessmentNotFound,
                ErrorCode::InternalServerError,
            ));
        }
    }

    match storage.list_submissions(assessment_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SubmissionListResponse { items },
            "Submissions retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::AssessmentNotFound,
            ErrorCode::InternalServerError,
        )),
    }
}
