use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::MarkerService;
use crate::models::common::response::storage_error_response;
use crate::models::markers::entities::{MarkerRole, MarkingStyle};
use crate::models::markers::requests::{CreateMarkerRequest, NewMarker};
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password};

pub async fn create_marker(
    service: &MarkerService,
    request: &HttpRequest,
    role: MarkerRole,
    create_request: CreateMarkerRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let email = create_request.marker_email.trim().to_string();

    // 校验输入
    if let Err(msg) = validate_email(&email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }
    if create_request.name.trim().is_empty() || create_request.surname.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "Name and surname are required",
        )));
    }
    if let Err(msg) = validate_password(&create_request.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    // 检查邮箱是否已被使用
    match storage.get_marker_by_email(&email).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::MarkerAlreadyExists,
                "Marker email already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::MarkerNotFound,
                ErrorCode::InternalServerError,
            ));
        }
    }

    let password_hash = match hash_password(&create_request.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash password: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to hash password",
                )),
            );
        }
    };

    let new_marker = NewMarker {
        marker_email: email,
        name: create_request.name.trim().to_string(),
        surname: create_request.surname.trim().to_string(),
        password_hash,
        marker_role: role,
        marking_style: create_request
            .marking_style
            .unwrap_or(MarkingStyle::TickPerMark),
    };

    match storage.create_marker(new_marker).await {
        Ok(marker) => {
            info!("{} {} created", marker.marker_role, marker.marker_email);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(marker, "Marker created successfully")))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::MarkerNotFound,
            ErrorCode::InternalServerError,
        )),
    }
}
