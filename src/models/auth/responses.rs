use crate::models::markers::entities::Marker;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub marker: Marker,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
