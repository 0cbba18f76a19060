use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateModuleRequest {
    pub module_code: String,
    pub module_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateModuleRequest {
    pub module_name: String,
}
