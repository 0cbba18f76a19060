use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ModuleService;
use crate::models::common::response::storage_error_response;
use crate::models::modules::responses::ModuleListResponse;
use crate::models::{ApiResponse, ErrorCode};

pub async fn list_modules(
    service: &ModuleService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_modules().await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ModuleListResponse { items },
            "Modules retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::ModuleNotFound,
            ErrorCode::InternalServerError,
        )),
    }
}
