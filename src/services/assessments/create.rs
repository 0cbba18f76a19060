use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssessmentService, current_marker};
use crate::models::assessments::requests::CreateAssessmentRequest;
use crate::models::assessments::responses::AssessmentCreatedResponse;
use crate::models::common::response::storage_error_response;
use crate::models::markers::entities::MarkerRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate::{validate_email, validate_emails, validate_total_mark};

pub async fn create_assessment(
    service: &AssessmentService,
    request: &HttpRequest,
    create_request: CreateAssessmentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let marker = match current_marker(request) {
        Ok(marker) => marker,
        Err(resp) => return Ok(resp),
    };

    // 管理员可以为指定讲师创建考核，讲师只能为自己创建
    let lecturer_email = match (&create_request.lecturer_email, marker.marker_role) {
        (Some(email), MarkerRole::Admin) if !email.trim().is_empty() => email.trim().to_string(),
        (Some(email), _) if email.trim() != marker.marker_email && !email.trim().is_empty() => {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::Forbidden,
                "You cannot create an assessment for another lecturer",
            )));
        }
        _ => marker.marker_email.clone(),
    };

    if let Err(resp) = validate_create_request(&lecturer_email, &create_request) {
        return Ok(resp);
    }

    match storage.get_module_by_code(create_request.module_code.trim()).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ModuleNotFound,
                format!("Module {} does not exist", create_request.module_code),
            )));
        }
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::ModuleNotFound,
                ErrorCode::AssessmentCreationFailed,
            ));
        }
    }

    match storage.create_assessment(&lecturer_email, create_request).await {
        Ok(assessment_id) => {
            info!(
                "Assessment {} created by {}",
                assessment_id, marker.marker_email
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                AssessmentCreatedResponse { assessment_id },
                "Assessment created successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::AssessmentNotFound,
            ErrorCode::AssessmentCreationFailed,
        )),
    }
}

fn validate_create_request(
    lecturer_email: &str,
    req: &CreateAssessmentRequest,
) -> Result<(), HttpResponse> {
    let bad_request = |msg: String| {
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg))
    };

    if req.assessment_name.trim().is_empty() {
        return Err(bad_request("Assessment name is required".to_string()));
    }
    if req.module_code.trim().is_empty() {
        return Err(bad_request("Module code is required".to_string()));
    }
    if let Err(msg) = validate_email(lecturer_email) {
        return Err(bad_request(format!("Lecturer email: {msg}")));
    }
    if let Err(e) = validate_total_mark(req.total_mark) {
        return Err(bad_request(e.message().to_string()));
    }
    validate_emails(req.marker_email.iter().chain(req.mod_email.iter())).map_err(bad_request)?;
    Ok(())
}
