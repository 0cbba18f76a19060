pub mod assessments;
pub mod auth;
pub mod markers;
pub mod modules;
pub mod submissions;

use actix_web::{HttpRequest, error::ErrorInternalServerError};
use std::sync::Arc;

use crate::storage::Storage;

pub use assessments::AssessmentService;
pub use auth::AuthService;
pub use markers::MarkerService;
pub use modules::ModuleService;
pub use submissions::SubmissionService;

/// 从 app_data 中取出存储实例
pub(crate) fn storage_from_request(request: &HttpRequest) -> actix_web::Result<Arc<dyn Storage>> {
    request
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| ErrorInternalServerError("Storage not found in app data"))
}
