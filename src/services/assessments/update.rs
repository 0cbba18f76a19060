use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::{AssessmentService, load_managed_assessment};
use crate::models::assessments::entities::RescaleReport;
use crate::models::assessments::requests::{UpdateAssessmentRequest, UpdateTotalMarkRequest};
use crate::models::assessments::responses::{AggregateCountsResponse, AssessmentUpdatedResponse};
use crate::models::common::response::storage_error_response;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate::{validate_emails, validate_total_mark};

pub async fn update_assessment(
    service: &AssessmentService,
    request: &HttpRequest,
    assessment_id: i64,
    update_request: UpdateAssessmentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(resp) = load_managed_assessment(&storage, request, assessment_id).await {
        return Ok(resp);
    }

    if let Err(resp) = validate_update_request(&update_request) {
        return Ok(resp);
    }

    let rescale = match storage.update_assessment(assessment_id, update_request).await {
        Ok(rescale) => rescale,
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::AssessmentNotFound,
                ErrorCode::AssessmentUpdateFailed,
            ));
        }
    };

    let assessment = match storage.get_assessment_by_id(assessment_id).await {
        Ok(Some(assessment)) => assessment,
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
    };

    info!("Assessment {} updated", assessment_id);
    let partial = rescale.as_ref().is_some_and(|r| !r.is_complete());
    let response = AssessmentUpdatedResponse {
        assessment,
        rescale,
    };

    if partial {
        warn!("Assessment {} updated but some marks were not rescaled", assessment_id);
        return Ok(HttpResponse::Ok().json(ApiResponse::error(
            ErrorCode::RescalePartiallyFailed,
            response,
            "Assessment updated, some submission marks could not be rescaled",
        )));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Assessment updated successfully",
    )))
}

pub async fn update_total_mark(
    service: &AssessmentService,
    request: &HttpRequest,
    assessment_id: i64,
    update_request: UpdateTotalMarkRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(resp) = load_managed_assessment(&storage, request, assessment_id).await {
        return Ok(resp);
    }

    match storage
        .update_assessment_total_mark(assessment_id, update_request.total_mark)
        .await
    {
        Ok(report) => Ok(rescale_response(report)),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::AssessmentNotFound,
            ErrorCode::AssessmentUpdateFailed,
        )),
    }
}

pub async fn recalculate(
    service: &AssessmentService,
    request: &HttpRequest,
    assessment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(resp) = load_managed_assessment(&storage, request, assessment_id).await {
        return Ok(resp);
    }

    match storage.recalculate_aggregates(assessment_id).await {
        Ok(counts) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AggregateCountsResponse {
                assessment_id,
                counts,
            },
            "Submission counts recalculated",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::AssessmentNotFound,
            ErrorCode::AssessmentUpdateFailed,
        )),
    }
}

fn rescale_response(report: RescaleReport) -> HttpResponse {
    if report.is_complete() {
        HttpResponse::Ok().json(ApiResponse::success(report, "Total mark updated"))
    } else {
        HttpResponse::Ok().json(ApiResponse::error(
            ErrorCode::RescalePartiallyFailed,
            report,
            "Total mark updated, some submission marks could not be rescaled",
        ))
    }
}

fn validate_update_request(req: &UpdateAssessmentRequest) -> Result<(), HttpResponse> {
    let bad_request = |msg: String| {
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg))
    };

    if req.assessment_name.trim().is_empty() {
        return Err(bad_request("Assessment name is required".to_string()));
    }
    if req.module_code.trim().is_empty() {
        return Err(bad_request("Module code is required".to_string()));
    }
    if let Err(e) = validate_total_mark(req.total_mark) {
        return Err(bad_request(e.message().to_string()));
    }
    validate_emails(req.marker_email.iter().chain(req.mod_email.iter())).map_err(bad_request)
}
