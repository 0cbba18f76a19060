use serde::Serialize;

use super::entities::Module;

#[derive(Debug, Serialize)]
pub struct ModuleListResponse {
    pub items: Vec<Module>,
}
