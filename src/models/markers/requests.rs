use serde::Deserialize;

use super::entities::{MarkerRole, MarkingStyle};

// 新增阅卷人请求，角色由接口决定（讲师或助教）
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMarkerRequest {
    pub marker_email: String,
    pub name: String,
    pub surname: String,
    pub password: String,
    pub marking_style: Option<MarkingStyle>,
}

// 存储层使用的新增参数，密码已哈希
#[derive(Debug, Clone)]
pub struct NewMarker {
    pub marker_email: String,
    pub name: String,
    pub surname: String,
    pub password_hash: String,
    pub marker_role: MarkerRole,
    pub marking_style: MarkingStyle,
}

// 编辑阅卷人请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMarkerRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub marker_role: Option<MarkerRole>,
    pub marking_style: Option<MarkingStyle>,
    pub password: Option<String>,
}
