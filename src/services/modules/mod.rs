pub mod list;
pub mod manage;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::modules::requests::{CreateModuleRequest, UpdateModuleRequest};
use crate::storage::Storage;

pub struct ModuleService {
    storage: Option<Arc<dyn Storage>>,
}

impl ModuleService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_modules(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_modules(self, request).await
    }

    pub async fn create_module(
        &self,
        request: &HttpRequest,
        create_request: CreateModuleRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_module(self, request, create_request).await
    }

    pub async fn update_module(
        &self,
        request: &HttpRequest,
        module_code: String,
        update_request: UpdateModuleRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_module(self, request, module_code, update_request).await
    }

    pub async fn delete_module(
        &self,
        request: &HttpRequest,
        module_code: String,
    ) -> ActixResult<HttpResponse> {
        manage::delete_module(self, request, module_code).await
    }
}
