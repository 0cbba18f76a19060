use serde::{Deserialize, Serialize};

// 逐题评分：同一提交下题目文本唯一
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionMark {
    pub id: i64,
    pub submission_id: i64,
    pub question_text: String,
    pub mark_allocation: f64,
}
