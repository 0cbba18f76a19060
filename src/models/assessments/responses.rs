use serde::Serialize;

use super::entities::{AggregateCounts, Assessment, RescaleReport};

#[derive(Debug, Serialize)]
pub struct AssessmentCreatedResponse {
    pub assessment_id: i64,
}

#[derive(Debug, Serialize)]
pub struct AssessmentListResponse {
    pub items: Vec<Assessment>,
}

// 编辑考核响应；满分变化时附带分数重算结果
#[derive(Debug, Serialize)]
pub struct AssessmentUpdatedResponse {
    pub assessment: Assessment,
    pub rescale: Option<RescaleReport>,
}

#[derive(Debug, Serialize)]
pub struct AggregateCountsResponse {
    pub assessment_id: i64,
    #[serde(flatten)]
    pub counts: AggregateCounts,
}
