//! 提交存储操作
//!
//! 影响状态或数量的写操作与考核计数刷新在同一事务内完成。

use super::SeaOrmStorage;
use super::aggregates::recalculate_aggregates_in;
use super::roster::assessment_exists;
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions, SubmissionRow};
use crate::errors::{MaatError, Result};
use crate::models::submissions::{
    entities::{Submission, SubmissionStatus},
    requests::{CreateSubmissionRequest, UpdateSubmissionRequest},
};
use crate::utils::validate::validate_mark;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

impl SeaOrmStorage {
    /// 新增提交并刷新考核计数
    pub async fn create_submission_impl(&self, req: CreateSubmissionRequest) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let status = req.submission_status.unwrap_or(SubmissionStatus::Unmarked);

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| MaatError::database_operation(format!("开启事务失败: {e}")))?;

        if !assessment_exists(&txn, req.assessment_id).await? {
            return Err(MaatError::not_found(format!(
                "考核 {} 不存在",
                req.assessment_id
            )));
        }

        let model = ActiveModel {
            assessment_id: Set(req.assessment_id),
            student_num: Set(req.student_num),
            student_name: Set(req.student_name),
            student_surname: Set(req.student_surname),
            submission_status: Set(status.to_string()),
            submission_mark: Set(None),
            submission_pdf: Set(req.submission_pdf),
            marked_submission_pdf: Set(None),
            submission_folder_name: Set(req.submission_folder_name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| MaatError::database_operation(format!("创建提交失败: {e}")))?;

        recalculate_aggregates_in(&txn, req.assessment_id).await?;

        txn.commit()
            .await
            .map_err(|e| MaatError::database_operation(format!("提交事务失败: {e}")))?;

        info!(
            "考核 {} 新增提交 {}（{}）",
            req.assessment_id, inserted.id, status
        );
        Ok(inserted.id)
    }

    /// 编辑提交并刷新考核计数
    pub async fn update_submission_impl(
        &self,
        submission_id: i64,
        update: UpdateSubmissionRequest,
    ) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| MaatError::database_operation(format!("开启事务失败: {e}")))?;

        let assessment_id = Submissions::find_by_id(submission_id)
            .select_only()
            .column(Column::AssessmentId)
            .into_tuple::<i64>()
            .one(&txn)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询提交失败: {e}")))?
            .ok_or_else(|| MaatError::not_found(format!("提交 {submission_id} 不存在")))?;

        let mut model = ActiveModel {
            id: Set(submission_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(student_num) = update.student_num {
            model.student_num = Set(student_num);
        }
        if let Some(student_name) = update.student_name {
            model.student_name = Set(student_name);
        }
        if let Some(student_surname) = update.student_surname {
            model.student_surname = Set(student_surname);
        }
        if let Some(pdf) = update.submission_pdf {
            model.submission_pdf = Set(Some(pdf));
        }
        if let Some(status) = update.submission_status {
            model.submission_status = Set(status.to_string());
        }
        if let Some(folder) = update.submission_folder_name {
            model.submission_folder_name = Set(Some(folder));
        }

        model
            .update(&txn)
            .await
            .map_err(|e| MaatError::database_operation(format!("更新提交失败: {e}")))?;

        recalculate_aggregates_in(&txn, assessment_id).await?;

        txn.commit()
            .await
            .map_err(|e| MaatError::database_operation(format!("提交事务失败: {e}")))?;

        debug!("提交 {} 已更新", submission_id);
        Ok(())
    }

    /// 修改提交状态，进出 Marked 时刷新考核计数
    pub async fn update_submission_status_impl(
        &self,
        submission_id: i64,
        status: SubmissionStatus,
    ) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| MaatError::database_operation(format!("开启事务失败: {e}")))?;

        let (assessment_id, previous) = Submissions::find_by_id(submission_id)
            .select_only()
            .column(Column::AssessmentId)
            .column(Column::SubmissionStatus)
            .into_tuple::<(i64, String)>()
            .one(&txn)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询提交失败: {e}")))?
            .ok_or_else(|| MaatError::not_found(format!("提交 {submission_id} 不存在")))?;

        let previous = previous
            .parse::<SubmissionStatus>()
            .map_err(|e| {
                MaatError::serialization(format!("提交 {submission_id} 的状态无法解析: {e}"))
            })?;

        Submissions::update_many()
            .col_expr(Column::SubmissionStatus, Expr::value(status.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(submission_id))
            .exec(&txn)
            .await
            .map_err(|e| MaatError::database_operation(format!("更新提交状态失败: {e}")))?;

        if SubmissionStatus::crosses_marked_boundary(previous, status) {
            recalculate_aggregates_in(&txn, assessment_id).await?;
        }

        txn.commit()
            .await
            .map_err(|e| MaatError::database_operation(format!("提交事务失败: {e}")))?;

        debug!("提交 {} 状态 {} -> {}", submission_id, previous, status);
        Ok(())
    }

    /// 修改提交分数（百分制），不影响计数
    pub async fn update_submission_mark_impl(&self, submission_id: i64, mark: f64) -> Result<()> {
        validate_mark(mark)?;

        let result = Submissions::update_many()
            .col_expr(Column::SubmissionMark, Expr::value(mark))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(submission_id))
            .exec(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("更新提交分数失败: {e}")))?;

        if result.rows_affected == 0 && !self.submission_exists(submission_id).await? {
            return Err(MaatError::not_found(format!("提交 {submission_id} 不存在")));
        }
        Ok(())
    }

    /// MySQL 对未改变的行不计入 rows_affected，需要再确认一次
    async fn submission_exists(&self, submission_id: i64) -> Result<bool> {
        let count = Submissions::find_by_id(submission_id)
            .count(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询提交失败: {e}")))?;
        Ok(count > 0)
    }

    /// 提交所属的考核 ID
    pub(crate) async fn submission_assessment_id(&self, submission_id: i64) -> Result<i64> {
        self.timed(
            "submission_assessment_id",
            async {
                Submissions::find_by_id(submission_id)
                    .select_only()
                    .column(Column::AssessmentId)
                    .into_tuple::<i64>()
                    .one(&self.db)
                    .await
                    .map_err(|e| MaatError::database_operation(format!("查询提交失败: {e}")))?
                    .ok_or_else(|| MaatError::not_found(format!("提交 {submission_id} 不存在")))
            },
        )
        .await
    }

    /// 通过 ID 获取提交（不含 PDF）
    pub async fn get_submission_by_id_impl(&self, submission_id: i64) -> Result<Option<Submission>> {
        let row = Submissions::find_by_id(submission_id)
            .select_only()
            .columns(SubmissionRow::columns())
            .into_model::<SubmissionRow>()
            .one(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(row.map(|r| r.into_submission()))
    }

    /// 列出考核下的提交
    pub async fn list_submissions_impl(&self, assessment_id: i64) -> Result<Vec<Submission>> {
        let rows = Submissions::find()
            .select_only()
            .columns(SubmissionRow::columns())
            .filter(Column::AssessmentId.eq(assessment_id))
            .order_by_asc(Column::StudentSurname)
            .order_by_asc(Column::Id)
            .into_model::<SubmissionRow>()
            .all(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询提交列表失败: {e}")))?;

        Ok(rows.into_iter().map(|r| r.into_submission()).collect())
    }

    /// 读取单个 PDF 列；提交不存在时返回 NotFound
    async fn load_pdf(&self, submission_id: i64, column: Column) -> Result<Option<Vec<u8>>> {
        Submissions::find_by_id(submission_id)
            .select_only()
            .column(column)
            .into_tuple::<Option<Vec<u8>>>()
            .one(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询提交 PDF 失败: {e}")))?
            .ok_or_else(|| MaatError::not_found(format!("提交 {submission_id} 不存在")))
    }

    /// 获取学生提交的 PDF
    pub async fn get_submission_pdf_impl(&self, submission_id: i64) -> Result<Option<Vec<u8>>> {
        self.load_pdf(submission_id, Column::SubmissionPdf).await
    }

    /// 获取批改后的 PDF
    pub async fn get_marked_submission_pdf_impl(
        &self,
        submission_id: i64,
    ) -> Result<Option<Vec<u8>>> {
        self.load_pdf(submission_id, Column::MarkedSubmissionPdf)
            .await
    }

    /// 保存批改后的 PDF
    pub async fn upload_marked_submission_impl(
        &self,
        submission_id: i64,
        pdf: Vec<u8>,
    ) -> Result<()> {
        let size = pdf.len();
        let result = Submissions::update_many()
            .col_expr(Column::MarkedSubmissionPdf, Expr::value(pdf))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(submission_id))
            .exec(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("保存批改 PDF 失败: {e}")))?;

        if result.rows_affected == 0 && !self.submission_exists(submission_id).await? {
            return Err(MaatError::not_found(format!("提交 {submission_id} 不存在")));
        }

        info!("提交 {} 已上传批改 PDF（{} 字节）", submission_id, size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::testing::{
        create_storage, fail_updates_of_submission, seed_assessment, seed_submission,
    };

    fn new_submission(assessment_id: i64) -> CreateSubmissionRequest {
        CreateSubmissionRequest {
            assessment_id,
            student_num: "s221234567".to_string(),
            student_name: "Sipho".to_string(),
            student_surname: "Dlamini".to_string(),
            submission_pdf: Some(b"%PDF-1.7 body".to_vec()),
            submission_status: None,
            submission_folder_name: Some("s221234567_Dlamini".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_unmarked_and_stores_pdf() {
        let storage = create_storage().await;
        let assessment_id = seed_assessment(&storage, 100.0, &[]).await;

        let id = storage
            .create_submission_impl(new_submission(assessment_id))
            .await
            .unwrap();

        let submission = storage.get_submission_by_id_impl(id).await.unwrap().unwrap();
        assert_eq!(submission.submission_status, SubmissionStatus::Unmarked);
        assert_eq!(submission.submission_mark, None);
        assert_eq!(
            storage.get_submission_pdf_impl(id).await.unwrap().as_deref(),
            Some(&b"%PDF-1.7 body"[..])
        );
        assert_eq!(storage.get_marked_submission_pdf_impl(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_for_unknown_assessment_is_not_found() {
        let storage = create_storage().await;
        let err = storage
            .create_submission_impl(new_submission(3))
            .await
            .unwrap_err();
        assert!(matches!(err, MaatError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_edit_recalculates_counts() {
        let storage = create_storage().await;
        let assessment_id = seed_assessment(&storage, 100.0, &[]).await;
        let id = seed_submission(&storage, assessment_id, SubmissionStatus::Unmarked, None).await;

        storage
            .update_submission_impl(
                id,
                UpdateSubmissionRequest {
                    student_name: Some("Lindiwe".to_string()),
                    submission_status: Some(SubmissionStatus::Marked),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let submission = storage.get_submission_by_id_impl(id).await.unwrap().unwrap();
        assert_eq!(submission.student_name, "Lindiwe");
        assert_eq!(submission.student_surname, "Nkosi");

        let assessment = storage
            .get_assessment_by_id_impl(assessment_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(assessment.num_submissions_marked, 1);
    }

    #[tokio::test]
    async fn test_status_failure_keeps_counts_consistent() {
        let storage = create_storage().await;
        let assessment_id = seed_assessment(&storage, 100.0, &[]).await;
        let id = seed_submission(&storage, assessment_id, SubmissionStatus::Unmarked, None).await;
        fail_updates_of_submission(&storage, id).await;

        let err = storage
            .update_submission_status_impl(id, SubmissionStatus::Marked)
            .await
            .unwrap_err();
        assert!(matches!(err, MaatError::DatabaseOperation(_)));

        let assessment = storage
            .get_assessment_by_id_impl(assessment_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(assessment.num_submissions_marked, 0);
    }

    #[tokio::test]
    async fn test_corrupt_stored_status_is_surfaced() {
        use sea_orm::ConnectionTrait;

        let storage = create_storage().await;
        let assessment_id = seed_assessment(&storage, 100.0, &[]).await;
        let id = seed_submission(&storage, assessment_id, SubmissionStatus::Marked, None).await;
        storage
            .db
            .execute_unprepared(&format!(
                "UPDATE submissions SET submission_status = 'Lost' WHERE id = {id}"
            ))
            .await
            .unwrap();

        let err = storage
            .update_submission_status_impl(id, SubmissionStatus::Unmarked)
            .await
            .unwrap_err();
        assert!(matches!(err, MaatError::Serialization(_)));

        // 事务回滚，计数保持不变
        let assessment = storage
            .get_assessment_by_id_impl(assessment_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(assessment.num_submissions_marked, 1);
    }

    #[tokio::test]
    async fn test_mark_update_validates_range() {
        let storage = create_storage().await;
        let assessment_id = seed_assessment(&storage, 100.0, &[]).await;
        let id = seed_submission(&storage, assessment_id, SubmissionStatus::InProgress, None).await;

        assert!(matches!(
            storage.update_submission_mark_impl(id, 100.5).await,
            Err(MaatError::Validation(_))
        ));
        assert!(matches!(
            storage.update_submission_mark_impl(id, f64::NAN).await,
            Err(MaatError::Validation(_))
        ));
        assert!(matches!(
            storage.update_submission_mark_impl(999, 50.0).await,
            Err(MaatError::NotFound(_))
        ));

        storage.update_submission_mark_impl(id, 72.25).await.unwrap();
        let submission = storage.get_submission_by_id_impl(id).await.unwrap().unwrap();
        assert_eq!(submission.submission_mark, Some(72.25));
        // 仅改分数不改变状态
        assert_eq!(submission.submission_status, SubmissionStatus::InProgress);
    }

    #[tokio::test]
    async fn test_upload_marked_pdf() {
        let storage = create_storage().await;
        let assessment_id = seed_assessment(&storage, 100.0, &[]).await;
        let id = seed_submission(&storage, assessment_id, SubmissionStatus::Marked, Some(88.0)).await;

        storage
            .upload_marked_submission_impl(id, b"%PDF-1.7 marked".to_vec())
            .await
            .unwrap();
        assert_eq!(
            storage
                .get_marked_submission_pdf_impl(id)
                .await
                .unwrap()
                .as_deref(),
            Some(&b"%PDF-1.7 marked"[..])
        );

        assert!(matches!(
            storage.upload_marked_submission_impl(404, vec![1]).await,
            Err(MaatError::NotFound(_))
        ));
        assert!(matches!(
            storage.get_submission_pdf_impl(404).await,
            Err(MaatError::NotFound(_))
        ));
    }
}
