pub mod assessments;
pub mod auth;
pub mod common;
pub mod markers;
pub mod modules;
pub mod questions;
pub mod submissions;

pub use common::response::ApiResponse;

/// 应用启动时间，用于统计预处理耗时
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码，随 ApiResponse 一起返回
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    ValidationFailed = 1001,
    NotFound = 1004,
    InternalServerError = 1500,
    StoreTimeout = 1504,

    // 认证
    Unauthorized = 2000,
    AuthFailed = 2001,
    Forbidden = 2003,

    // 考核
    AssessmentNotFound = 3000,
    AssessmentCreationFailed = 3001,
    AssessmentUpdateFailed = 3002,
    AssessmentDeleteFailed = 3003,
    RescaleConfigurationInvalid = 3004,
    RescalePartiallyFailed = 3005,
    MemorandumNotFound = 3006,

    // 提交
    SubmissionNotFound = 4000,
    SubmissionCreationFailed = 4001,
    SubmissionUpdateFailed = 4002,
    SubmissionPdfNotFound = 4003,
    FileTypeNotAllowed = 4004,
    FileSizeExceeded = 4005,
    FileNotFound = 4006,

    // 阅卷人
    MarkerNotFound = 5000,
    MarkerAlreadyExists = 5001,
    MarkerUpdateFailed = 5002,

    // 课程模块
    ModuleNotFound = 6000,
    ModuleAlreadyExists = 6001,

    // 逐题评分
    QuestionMarksNotFound = 7000,
}
