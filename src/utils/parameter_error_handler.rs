use actix_web::{
    HttpRequest, HttpResponse,
    error::{InternalError, JsonPayloadError, QueryPayloadError},
};

use crate::models::{ApiResponse, ErrorCode};

/// JSON 请求体解析失败时返回统一格式
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let (mut response, message) = match &err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => (
            HttpResponse::PayloadTooLarge(),
            "请求体过大".to_string(),
        ),
        JsonPayloadError::ContentType => (
            HttpResponse::UnsupportedMediaType(),
            "Content-Type 必须为 application/json".to_string(),
        ),
        _ => (HttpResponse::BadRequest(), format!("请求体格式错误: {err}")),
    };
    let body = ApiResponse::error_empty(ErrorCode::BadRequest, message);
    InternalError::from_response(err, response.json(body)).into()
}

/// 查询参数解析失败时返回统一格式
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = ApiResponse::error_empty(ErrorCode::BadRequest, format!("查询参数错误: {err}"));
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}
