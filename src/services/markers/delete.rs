use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::MarkerService;
use crate::middlewares::RequireJWT;
use crate::models::common::response::storage_error_response;
use crate::models::{ApiResponse, ErrorCode};

pub async fn delete_marker(
    service: &MarkerService,
    request: &HttpRequest,
    marker_email: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    // 不能删除自己
    if RequireJWT::extract_marker_email(request).as_deref() == Some(marker_email.as_str()) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "You cannot delete your own account",
        )));
    }

    match storage.delete_marker(&marker_email).await {
        Ok(true) => {
            service.invalidate_cached_marker(request, &marker_email).await;
            info!("Marker {} deleted", marker_email);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Marker deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::MarkerNotFound,
            "Marker not found",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::MarkerNotFound,
            ErrorCode::MarkerUpdateFailed,
        )),
    }
}
