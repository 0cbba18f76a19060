/*!
 * JWT 认证中间件
 *
 * 验证 `Authorization: Bearer <JWT_TOKEN>`，令牌有效时将阅卷人信息存入请求扩展。
 *
 * ```rust,ignore
 * web::scope("/api/v1/assessments")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_assessments))
 * ```
 *
 * 处理程序中通过 `RequireJWT::extract_marker(&req)` 取得当前阅卷人。
 * 阅卷人信息按邮箱缓存，编辑或删除阅卷人时需移除 `marker:{email}` 缓存项。
 */

use crate::cache::{self, CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::markers::entities::{Marker, MarkerRole};
use crate::storage::Storage;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

enum AuthFailure {
    Unauthorized(String),
    Internal(String),
}

// 辅助函数：提取并验证 JWT access token
async fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<Marker, AuthFailure> {
    let token = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| {
            AuthFailure::Unauthorized("Missing or invalid Authorization header".to_string())
        })?;

    let claims = crate::utils::jwt::JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        AuthFailure::Unauthorized("Invalid JWT token".to_string())
    })?;

    let cache = req
        .app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| AuthFailure::Internal("Cache not found in app data".to_string()))?;

    let key = cache::marker_cache_key(&claims.sub);
    match cache::get_json::<Marker>(cache.as_ref(), &key).await {
        CacheResult::Found(marker) => return Ok(marker),
        _ => debug!("Marker not found in cache: {}", claims.sub),
    }

    let storage = req
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| AuthFailure::Internal("Storage not found in app data".to_string()))?;

    let marker = storage
        .get_marker_by_email(&claims.sub)
        .await
        .map_err(|e| {
            error!("Failed to retrieve marker from storage: {}", e);
            AuthFailure::Internal("Failed to retrieve marker from storage".to_string())
        })?
        .ok_or_else(|| AuthFailure::Unauthorized("Marker not found".to_string()))?;

    cache::insert_json(
        cache.as_ref(),
        key,
        &marker,
        AppConfig::get().cache.default_ttl,
    )
    .await;

    Ok(marker)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match extract_and_validate_jwt(&req).await {
                Ok(marker) => {
                    debug!("JWT authentication successful for {}", marker.marker_email);
                    req.extensions_mut().insert(marker);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(AuthFailure::Unauthorized(err)) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
                Err(AuthFailure::Internal(err)) => Ok(req.into_response(
                    create_error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::InternalServerError,
                        &err,
                    )
                    .map_into_right_body(),
                )),
            }
        })
    }
}

// 辅助函数：从请求中提取阅卷人信息
impl RequireJWT {
    /// 从请求扩展中提取当前阅卷人
    pub fn extract_marker(req: &actix_web::HttpRequest) -> Option<Marker> {
        req.extensions().get::<Marker>().cloned()
    }

    /// 从请求扩展中提取阅卷人邮箱
    pub fn extract_marker_email(req: &actix_web::HttpRequest) -> Option<String> {
        req.extensions()
            .get::<Marker>()
            .map(|marker| marker.marker_email.clone())
    }

    /// 从请求扩展中提取阅卷人角色
    pub fn extract_marker_role(req: &actix_web::HttpRequest) -> Option<MarkerRole> {
        req.extensions().get::<Marker>().map(|marker| marker.marker_role)
    }
}
