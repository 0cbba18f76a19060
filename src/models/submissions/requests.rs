use serde::Deserialize;

use super::entities::SubmissionStatus;

// 新增提交请求，PDF 以字节数组传输
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubmissionRequest {
    pub assessment_id: i64,
    pub student_num: String,
    pub student_name: String,
    pub student_surname: String,
    pub submission_pdf: Option<Vec<u8>>,
    pub submission_status: Option<SubmissionStatus>,
    pub submission_folder_name: Option<String>,
}

// 编辑提交请求，未提供的字段保持不变
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubmissionRequest {
    pub student_num: Option<String>,
    pub student_name: Option<String>,
    pub student_surname: Option<String>,
    pub submission_pdf: Option<Vec<u8>>,
    pub submission_status: Option<SubmissionStatus>,
    pub submission_folder_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSubmissionStatusRequest {
    pub submission_status: SubmissionStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSubmissionMarkRequest {
    pub submission_mark: f64,
}
