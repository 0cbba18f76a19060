use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::MarkerService;
use crate::models::common::response::storage_error_response;
use crate::models::markers::entities::MarkerRole;
use crate::models::markers::responses::MarkerListResponse;
use crate::models::{ApiResponse, ErrorCode};

pub async fn list_markers(
    service: &MarkerService,
    request: &HttpRequest,
    roles: &[MarkerRole],
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_markers(roles).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MarkerListResponse { items },
            "Markers retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::MarkerNotFound,
            ErrorCode::InternalServerError,
        )),
    }
}
