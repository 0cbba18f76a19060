use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::MarkerService;
use crate::models::common::response::storage_error_response;
use crate::models::markers::requests::UpdateMarkerRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::password::hash_password;
use crate::utils::validate::validate_password;

pub async fn update_marker(
    service: &MarkerService,
    request: &HttpRequest,
    marker_email: String,
    mut update_request: UpdateMarkerRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    // 新密码需校验并哈希
    if let Some(password) = update_request.password.take() {
        if let Err(msg) = validate_password(&password) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
        }
        match hash_password(&password) {
            Ok(hash) => update_request.password = Some(hash),
            Err(e) => {
                error!("Failed to hash password: {}", e);
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        "Failed to hash password",
                    )),
                );
            }
        }
    }

    if [&update_request.name, &update_request.surname]
        .into_iter()
        .flatten()
        .any(|v| v.trim().is_empty())
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "Name and surname cannot be empty",
        )));
    }

    match storage.update_marker(&marker_email, update_request).await {
        Ok(Some(marker)) => {
            service.invalidate_cached_marker(request, &marker_email).await;
            info!("Marker {} updated", marker_email);
            Ok(HttpResponse::Ok().json(ApiResponse::success(marker, "Marker updated successfully")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
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
