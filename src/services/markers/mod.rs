pub mod create;
pub mod delete;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::cache::{self, ObjectCache};
use crate::models::markers::entities::MarkerRole;
use crate::models::markers::requests::{CreateMarkerRequest, UpdateMarkerRequest};
use crate::storage::Storage;

pub struct MarkerService {
    storage: Option<Arc<dyn Storage>>,
}

impl MarkerService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    /// 阅卷人信息变化后移除认证缓存
    pub(crate) async fn invalidate_cached_marker(&self, request: &HttpRequest, marker_email: &str) {
        if let Some(cache) = request.app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>() {
            cache.remove(&cache::marker_cache_key(marker_email)).await;
        }
    }

    // 按角色列出阅卷人，roles 为空时列出全部
    pub async fn list_markers(
        &self,
        request: &HttpRequest,
        roles: &[MarkerRole],
    ) -> ActixResult<HttpResponse> {
        list::list_markers(self, request, roles).await
    }

    // 新增阅卷人，角色由接口决定
    pub async fn create_marker(
        &self,
        request: &HttpRequest,
        role: MarkerRole,
        create_request: CreateMarkerRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_marker(self, request, role, create_request).await
    }

    pub async fn update_marker(
        &self,
        request: &HttpRequest,
        marker_email: String,
        update_request: UpdateMarkerRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_marker(self, request, marker_email, update_request).await
    }

    pub async fn delete_marker(
        &self,
        request: &HttpRequest,
        marker_email: String,
    ) -> ActixResult<HttpResponse> {
        delete::delete_marker(self, request, marker_email).await
    }
}
