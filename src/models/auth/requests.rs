use serde::Deserialize;

// 阅卷人登录请求
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub marker_email: String,
    pub password: String,
}
