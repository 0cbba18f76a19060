use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SetQuestionMarkRequest {
    pub question_text: String,
    pub mark_allocation: f64,
}
