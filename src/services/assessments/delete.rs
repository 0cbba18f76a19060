use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde::Serialize;
use tracing::{error, info};

use super::{AssessmentService, load_managed_assessment};
use crate::errors::MaatError;
use crate::models::{ApiResponse, ErrorCode};

#[derive(Debug, Serialize)]
struct CascadeFailure {
    step: String,
}

pub async fn delete_assessment(
    service: &AssessmentService,
    request: &HttpRequest,
    assessment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(resp) = load_managed_assessment(&storage, request, assessment_id).await {
        return Ok(resp);
    }

    match storage.delete_assessment(assessment_id).await {
        Ok(true) => {
            info!("Assessment {} deleted", assessment_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Assessment deleted successfully",
            )))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssessmentNotFound,
            "Assessment not found",
        ))),
        Err(e) => {
            error!("Failed to delete assessment {}: {}", assessment_id, e);
            let body = ApiResponse::error(
                ErrorCode::AssessmentDeleteFailed,
                CascadeFailure {
                    step: e.step.to_string(),
                },
                e.to_string(),
            );
            match e.source {
                MaatError::Timeout(_) => Ok(HttpResponse::GatewayTimeout().json(body)),
                _ => Ok(HttpResponse::InternalServerError().json(body)),
            }
        }
    }
}
