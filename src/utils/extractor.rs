//! 安全的路径参数提取器
//!
//! 解析失败时直接返回统一格式的 400 响应，而不是 actix 默认的纯文本错误。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn bad_path(message: String) -> actix_web::Error {
    InternalError::from_response(
        message.clone(),
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

fn path_param<'a>(req: &'a HttpRequest, name: &str) -> Result<&'a str, actix_web::Error> {
    req.match_info()
        .get(name)
        .ok_or_else(|| bad_path(format!("缺少路径参数: {name}")))
}

/// 正整数 ID，取自 `{id}`
#[derive(Debug, Clone, Copy)]
pub struct SafeIDI64(pub i64);

impl FromRequest for SafeIDI64 {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(path_param(req, "id").and_then(|raw| match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(SafeIDI64(id)),
            _ => Err(bad_path(format!("无效的 ID: {raw}"))),
        }))
    }
}

/// 阅卷人邮箱，取自 `{email}`
#[derive(Debug, Clone)]
pub struct SafeEmail(pub String);

impl FromRequest for SafeEmail {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(path_param(req, "email").and_then(|raw| {
            let email = raw.trim();
            match super::validate::validate_email(email) {
                Ok(()) => Ok(SafeEmail(email.to_string())),
                Err(msg) => Err(bad_path(msg.to_string())),
            }
        }))
    }
}

/// 课程代码仅允许字母数字，最长 32 个字符
pub fn is_valid_module_code(code: &str) -> bool {
    !code.is_empty() && code.len() <= 32 && code.chars().all(|c| c.is_ascii_alphanumeric())
}

/// 课程代码，取自 `{code}`
#[derive(Debug, Clone)]
pub struct SafeModuleCode(pub String);

impl FromRequest for SafeModuleCode {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(path_param(req, "code").and_then(|raw| {
            if is_valid_module_code(raw) {
                Ok(SafeModuleCode(raw.to_string()))
            } else {
                Err(bad_path(format!("无效的课程代码: {raw}")))
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_module_code_rules() {
        assert!(is_valid_module_code("WRAV301"));
        assert!(!is_valid_module_code(""));
        assert!(!is_valid_module_code("WRAV 301"));
        assert!(!is_valid_module_code(&"A".repeat(33)));
    }

    #[actix_web::test]
    async fn test_id_must_be_positive() {
        let req = TestRequest::default().param("id", "42").to_http_request();
        let id = SafeIDI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 42);

        let req = TestRequest::default().param("id", "0").to_http_request();
        assert!(SafeIDI64::extract(&req).await.is_err());

        let req = TestRequest::default().param("id", "abc").to_http_request();
        assert!(SafeIDI64::extract(&req).await.is_err());
    }

    #[actix_web::test]
    async fn test_email_is_trimmed_and_validated() {
        let req = TestRequest::default()
            .param("email", "demi@mandela.ac.za")
            .to_http_request();
        assert_eq!(SafeEmail::extract(&req).await.unwrap().0, "demi@mandela.ac.za");

        let req = TestRequest::default().param("email", "nope").to_http_request();
        assert!(SafeEmail::extract(&req).await.is_err());
    }
}
