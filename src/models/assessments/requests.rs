use serde::Deserialize;

// 创建考核请求
//
// 备忘录沿用原有传输格式：字节数组
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssessmentRequest {
    pub lecturer_email: Option<String>,
    #[serde(default)]
    pub marker_email: Vec<String>,
    pub assessment_name: String,
    pub module_code: String,
    pub memorandum: Option<Vec<u8>>,
    #[serde(default)]
    pub mod_email: Vec<String>,
    pub total_mark: f64,
    pub assessment_type: String,
}

// 编辑考核请求
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAssessmentRequest {
    #[serde(default)]
    pub marker_email: Vec<String>,
    pub assessment_name: String,
    pub module_code: String,
    #[serde(default)]
    pub mod_email: Vec<String>,
    pub total_mark: f64,
    // 不提供则保留原备忘录
    pub memorandum: Option<Vec<u8>>,
}

// 调整满分请求
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTotalMarkRequest {
    pub total_mark: f64,
}

// 考核列表查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentListQuery {
    pub marker_email: Option<String>,
}
