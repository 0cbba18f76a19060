use serde::Serialize;

use super::entities::Submission;

#[derive(Debug, Serialize)]
pub struct SubmissionCreatedResponse {
    pub submission_id: i64,
}

#[derive(Debug, Serialize)]
pub struct SubmissionListResponse {
    pub items: Vec<Submission>,
}
