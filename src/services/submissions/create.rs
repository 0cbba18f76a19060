use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SubmissionService;
use crate::models::common::response::storage_error_response;
use crate::models::submissions::requests::CreateSubmissionRequest;
use crate::models::submissions::responses::SubmissionCreatedResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::assessments::load_managed_assessment;
use crate::utils::is_pdf;

pub async fn create_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    create_request: CreateSubmissionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(resp) = validate_create_request(&create_request) {
        return Ok(resp);
    }

    if let Err(resp) =
        load_managed_assessment(&storage, request, create_request.assessment_id).await
    {
        return Ok(resp);
    }

    let assessment_id = create_request.assessment_id;
    match storage.create_submission(create_request).await {
        Ok(submission_id) => {
            info!(
                "Submission {} created for assessment {}",
                submission_id, assessment_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                SubmissionCreatedResponse { submission_id },
                "Submission created successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::AssessmentNotFound,
            ErrorCode::SubmissionCreationFailed,
        )),
    }
}

fn validate_create_request(req: &CreateSubmissionRequest) -> Result<(), HttpResponse> {
    let bad_request = |code: ErrorCode, msg: &str| {
        HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg))
    };

    if req.student_num.trim().is_empty() {
        return Err(bad_request(
            ErrorCode::ValidationFailed,
            "Student number is required",
        ));
    }
    if req.student_name.trim().is_empty() || req.student_surname.trim().is_empty() {
        return Err(bad_request(
            ErrorCode::ValidationFailed,
            "Student name and surname are required",
        ));
    }
    if let Some(pdf) = &req.submission_pdf
        && !is_pdf(pdf)
    {
        return Err(bad_request(
            ErrorCode::FileTypeNotAllowed,
            "Submission must be a PDF document",
        ));
    }
    Ok(())
}
