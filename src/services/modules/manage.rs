use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ModuleService;
use crate::models::common::response::storage_error_response;
use crate::models::modules::requests::{CreateModuleRequest, UpdateModuleRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::extractor::is_valid_module_code;

fn name_required() -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::ValidationFailed,
        "Module name is required",
    ))
}

pub async fn create_module(
    service: &ModuleService,
    request: &HttpRequest,
    create_request: CreateModuleRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let module_code = create_request.module_code.trim().to_string();
    let module_name = create_request.module_name.trim().to_string();

    if !is_valid_module_code(&module_code) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "Module code must be alphanumeric",
        )));
    }
    if module_name.is_empty() {
        return Ok(name_required());
    }

    // 重复的课程代码
    match storage.get_module_by_code(&module_code).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::ModuleAlreadyExists,
                "Module code already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::ModuleNotFound,
                ErrorCode::InternalServerError,
            ));
        }
    }

    match storage
        .create_module(CreateModuleRequest {
            module_code,
            module_name,
        })
        .await
    {
        Ok(module) => {
            info!("Module {} created", module.module_code);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(module, "Module created successfully")))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::ModuleNotFound,
            ErrorCode::InternalServerError,
        )),
    }
}

pub async fn update_module(
    service: &ModuleService,
    request: &HttpRequest,
    module_code: String,
    update_request: UpdateModuleRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let module_name = update_request.module_name.trim();

    if module_name.is_empty() {
        return Ok(name_required());
    }

    match storage.update_module(&module_code, module_name).await {
        Ok(Some(module)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(module, "Module updated successfully"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ModuleNotFound,
            "Module not found",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::ModuleNotFound,
            ErrorCode::InternalServerError,
        )),
    }
}

pub async fn delete_module(
    service: &ModuleService,
    request: &HttpRequest,
    module_code: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.delete_module(&module_code).await {
        Ok(true) => {
            info!("Module {} deleted", module_code);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Module deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ModuleNotFound,
            "Module not found",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::ModuleNotFound,
            ErrorCode::InternalServerError,
        )),
    }
}
