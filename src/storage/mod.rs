use std::sync::Arc;

use crate::models::{
    assessments::{
        entities::{AggregateCounts, Assessment, EmailSet, RescaleReport, RosterChange},
        requests::{CreateAssessmentRequest, UpdateAssessmentRequest},
    },
    markers::{
        entities::{Marker, MarkerRole},
        requests::{NewMarker, UpdateMarkerRequest},
    },
    modules::{entities::Module, requests::CreateModuleRequest},
    questions::entities::QuestionMark,
    submissions::{
        entities::{Submission, SubmissionStatus},
        requests::{CreateSubmissionRequest, UpdateSubmissionRequest},
    },
};

use crate::errors::{CascadeError, Result};

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 考核管理方法
    // 创建考核，同时写入阅卷人名单，计数初始化为 0
    async fn create_assessment(
        &self,
        lecturer_email: &str,
        req: CreateAssessmentRequest,
    ) -> Result<i64>;
    // 编辑考核；满分变化时返回分数重算结果
    async fn update_assessment(
        &self,
        assessment_id: i64,
        update: UpdateAssessmentRequest,
    ) -> Result<Option<RescaleReport>>;
    // 调整满分并按比例重算所有提交分数
    async fn update_assessment_total_mark(
        &self,
        assessment_id: i64,
        new_total: f64,
    ) -> Result<RescaleReport>;
    // 级联删除考核，返回 false 表示考核不存在
    async fn delete_assessment(&self, assessment_id: i64) -> std::result::Result<bool, CascadeError>;
    // 通过ID获取考核信息（不含备忘录）
    async fn get_assessment_by_id(&self, assessment_id: i64) -> Result<Option<Assessment>>;
    // 阅卷人参与的考核（名单中或为讲师）
    async fn list_assessments_for_marker(&self, marker_email: &str) -> Result<Vec<Assessment>>;
    // 列出所有考核
    async fn list_all_assessments(&self) -> Result<Vec<Assessment>>;
    // 获取备忘录
    async fn get_memorandum(&self, assessment_id: i64) -> Result<Option<Vec<u8>>>;

    /// 名单与计数
    // 同步阅卷人名单
    async fn reconcile_roster(
        &self,
        assessment_id: i64,
        desired: &EmailSet,
    ) -> Result<RosterChange>;
    // 读取关联表中的阅卷人名单
    async fn list_roster(&self, assessment_id: i64) -> Result<EmailSet>;
    // 刷新考核的提交计数
    async fn recalculate_aggregates(&self, assessment_id: i64) -> Result<AggregateCounts>;

    /// 提交管理方法
    // 新增提交
    async fn create_submission(&self, req: CreateSubmissionRequest) -> Result<i64>;
    // 编辑提交
    async fn update_submission(
        &self,
        submission_id: i64,
        update: UpdateSubmissionRequest,
    ) -> Result<()>;
    // 修改提交状态
    async fn update_submission_status(
        &self,
        submission_id: i64,
        status: SubmissionStatus,
    ) -> Result<()>;
    // 修改提交分数
    async fn update_submission_mark(&self, submission_id: i64, mark: f64) -> Result<()>;
    // 通过ID获取提交信息（不含 PDF）
    async fn get_submission_by_id(&self, submission_id: i64) -> Result<Option<Submission>>;
    // 列出考核下的提交
    async fn list_submissions(&self, assessment_id: i64) -> Result<Vec<Submission>>;
    // 获取学生提交的 PDF
    async fn get_submission_pdf(&self, submission_id: i64) -> Result<Option<Vec<u8>>>;
    // 获取批改后的 PDF
    async fn get_marked_submission_pdf(&self, submission_id: i64) -> Result<Option<Vec<u8>>>;
    // 上传批改后的 PDF
    async fn upload_marked_submission(&self, submission_id: i64, pdf: Vec<u8>) -> Result<()>;

    /// 逐题评分方法
    async fn list_question_marks(&self, submission_id: i64) -> Result<Vec<QuestionMark>>;
    async fn set_question_mark(
        &self,
        submission_id: i64,
        question_text: &str,
        mark_allocation: f64,
    ) -> Result<QuestionMark>;

    /// 阅卷人管理方法
    async fn create_marker(&self, marker: NewMarker) -> Result<Marker>;
    async fn get_marker_by_email(&self, marker_email: &str) -> Result<Option<Marker>>;
    // roles 为空时列出全部
    async fn list_markers(&self, roles: &[MarkerRole]) -> Result<Vec<Marker>>;
    // password 字段需已是哈希值
    async fn update_marker(
        &self,
        marker_email: &str,
        update: UpdateMarkerRequest,
    ) -> Result<Option<Marker>>;
    // 删除阅卷人并从所有考核名单中移除
    async fn delete_marker(&self, marker_email: &str) -> Result<bool>;
    async fn count_markers(&self) -> Result<u64>;

    /// 课程模块管理方法
    async fn create_module(&self, module: CreateModuleRequest) -> Result<Module>;
    async fn get_module_by_code(&self, module_code: &str) -> Result<Option<Module>>;
    async fn list_modules(&self) -> Result<Vec<Module>>;
    async fn update_module(&self, module_code: &str, module_name: &str)
    -> Result<Option<Module>>;
    async fn delete_module(&self, module_code: &str) -> Result<bool>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
