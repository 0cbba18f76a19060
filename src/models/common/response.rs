use serde::{Deserialize, Serialize};

use crate::errors::MaatError;
use crate::models::ErrorCode;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error(code: ErrorCode, data: T, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// 将存储层错误映射为 HTTP 响应，`not_found` 为该资源对应的错误码
pub fn storage_error_response(
    err: &MaatError,
    not_found: ErrorCode,
    fallback: ErrorCode,
) -> actix_web::HttpResponse {
    use actix_web::HttpResponse;

    match err {
        MaatError::NotFound(msg) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(not_found, msg.clone()))
        }
        MaatError::Validation(msg) => HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg.clone())),
        MaatError::Configuration(msg) => HttpResponse::UnprocessableEntity().json(
            ApiResponse::error_empty(ErrorCode::RescaleConfigurationInvalid, msg.clone()),
        ),
        MaatError::Timeout(msg) => HttpResponse::GatewayTimeout()
            .json(ApiResponse::error_empty(ErrorCode::StoreTimeout, msg.clone())),
        _ => {
            tracing::error!("{}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error_empty(fallback, err.format_simple()))
        }
    }
}
