use serde::Serialize;

use super::entities::QuestionMark;

#[derive(Debug, Serialize)]
pub struct QuestionMarkListResponse {
    pub items: Vec<QuestionMark>,
}
