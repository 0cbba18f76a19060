use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::markers::entities::MarkerRole;
use crate::models::modules::requests::{CreateModuleRequest, UpdateModuleRequest};
use crate::services::ModuleService;
use crate::utils::SafeModuleCode;

// 懒加载的全局 MODULE_SERVICE 实例
static MODULE_SERVICE: Lazy<ModuleService> = Lazy::new(ModuleService::new_lazy);

pub async fn list_modules(req: HttpRequest) -> ActixResult<HttpResponse> {
    MODULE_SERVICE.list_modules(&req).await
}

pub async fn create_module(
    req: HttpRequest,
    module_data: web::Json<CreateModuleRequest>,
) -> ActixResult<HttpResponse> {
    MODULE_SERVICE
        .create_module(&req, module_data.into_inner())
        .await
}

pub async fn update_module(
    req: HttpRequest,
    code: SafeModuleCode,
    module_data: web::Json<UpdateModuleRequest>,
) -> ActixResult<HttpResponse> {
    MODULE_SERVICE
        .update_module(&req, code.0, module_data.into_inner())
        .await
}

pub async fn delete_module(req: HttpRequest, code: SafeModuleCode) -> ActixResult<HttpResponse> {
    MODULE_SERVICE.delete_module(&req, code.0).await
}

// 配置路由
pub fn configure_modules_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/modules")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_modules))
                    .route(
                        web::post()
                            .to(create_module)
                            .wrap(middlewares::RequireRole::new_any(MarkerRole::lecturer_roles())),
                    ),
            )
            .service(
                web::resource("/{code}")
                    .wrap(middlewares::RequireRole::new_any(MarkerRole::lecturer_roles()))
                    .route(web::put().to(update_module))
                    .route(web::delete().to(delete_module)),
            ),
    );
}
