//! 考核存储操作

use super::SeaOrmStorage;
use super::rescale::{plan_rescale, validate_scale};
use super::roster::reconcile_roster_in;
use crate::entity::assessment_markers::{
    Column as AssessmentMarkerColumn, Entity as AssessmentMarkers,
};
use crate::entity::assessments::{ActiveModel, AssessmentRow, Column, Entity as Assessments};
use crate::errors::{MaatError, Result};
use crate::models::assessments::{
    entities::{Assessment, EmailSet, RescaleReport},
    requests::{CreateAssessmentRequest, UpdateAssessmentRequest},
};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

/// 读取考核当前满分
async fn load_total_mark<C: ConnectionTrait>(conn: &C, assessment_id: i64) -> Result<f64> {
    Assessments::find_by_id(assessment_id)
        .select_only()
        .column(Column::TotalMark)
        .into_tuple::<f64>()
        .one(conn)
        .await
        .map_err(|e| MaatError::database_operation(format!("查询考核失败: {e}")))?
        .ok_or_else(|| MaatError::not_found(format!("考核 {assessment_id} 不存在")))
}

impl SeaOrmStorage {
    /// 创建考核：考核行、阅卷人名单、初始计数在同一事务内写入
    pub async fn create_assessment_impl(
        &self,
        lecturer_email: &str,
        req: CreateAssessmentRequest,
    ) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let markers: EmailSet = req.marker_email.into_iter().collect();
        let moderators: EmailSet = req.mod_email.into_iter().collect();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| MaatError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            module_code: Set(req.module_code),
            assessment_name: Set(req.assessment_name),
            lecturer_email: Set(lecturer_email.to_string()),
            mod_email: Set(moderators.encode()?),
            // 名单同步时写入
            marker_email: Set(EmailSet::new().encode()?),
            total_mark: Set(req.total_mark),
            total_num_submissions: Set(0),
            num_submissions_marked: Set(0),
            memorandum: Set(req.memorandum),
            assessment_type: Set(req.assessment_type),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| MaatError::database_operation(format!("创建考核失败: {e}")))?;

        reconcile_roster_in(&txn, inserted.id, &markers).await?;

        txn.commit()
            .await
            .map_err(|e| MaatError::database_operation(format!("提交事务失败: {e}")))?;

        info!(
            "考核 {} 已创建，讲师 {}，阅卷人 {} 名",
            inserted.id,
            lecturer_email,
            markers.len()
        );
        Ok(inserted.id)
    }

    /// 编辑考核
    ///
    /// 字段更新、名单同步与重算计划在同一事务内；满分变化时提交后按计划写回分数。
    pub async fn update_assessment_impl(
        &self,
        assessment_id: i64,
        update: UpdateAssessmentRequest,
    ) -> Result<Option<RescaleReport>> {
        let new_total = update.total_mark;
        let markers: EmailSet = update.marker_email.into_iter().collect();
        let moderators: EmailSet = update.mod_email.into_iter().collect();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| MaatError::database_operation(format!("开启事务失败: {e}")))?;

        let old_total = load_total_mark(&txn, assessment_id).await?;
        let plan = if old_total != new_total {
            validate_scale(old_total, new_total)?;
            Some(plan_rescale(&txn, assessment_id, old_total, new_total).await?)
        } else {
            None
        };

        let mut model = ActiveModel {
            id: Set(assessment_id),
            assessment_name: Set(update.assessment_name),
            module_code: Set(update.module_code),
            mod_email: Set(moderators.encode()?),
            total_mark: Set(new_total),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(memorandum) = update.memorandum {
            model.memorandum = Set(Some(memorandum));
        }

        model
            .update(&txn)
            .await
            .map_err(|e| MaatError::database_operation(format!("更新考核失败: {e}")))?;

        reconcile_roster_in(&txn, assessment_id, &markers).await?;

        txn.commit()
            .await
            .map_err(|e| MaatError::database_operation(format!("提交事务失败: {e}")))?;

        info!("考核 {} 已更新", assessment_id);

        match plan {
            Some(plan) => Ok(Some(self.apply_rescale(assessment_id, plan).await)),
            None => Ok(None),
        }
    }

    /// 调整满分并按比例重算分数
    ///
    /// 读取旧满分与待重算分数、写入新满分在同一事务内完成。
    pub async fn update_assessment_total_mark_impl(
        &self,
        assessment_id: i64,
        new_total: f64,
    ) -> Result<RescaleReport> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| MaatError::database_operation(format!("开启事务失败: {e}")))?;

        let old_total = load_total_mark(&txn, assessment_id).await?;
        validate_scale(old_total, new_total)?;

        if old_total == new_total {
            debug!("考核 {} 满分未变化，跳过重算", assessment_id);
            return Ok(RescaleReport {
                old_total,
                new_total,
                ..Default::default()
            });
        }

        let plan = plan_rescale(&txn, assessment_id, old_total, new_total).await?;

        Assessments::update_many()
            .col_expr(Column::TotalMark, Expr::value(new_total))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(assessment_id))
            .exec(&txn)
            .await
            .map_err(|e| MaatError::database_operation(format!("更新考核满分失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| MaatError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(self.apply_rescale(assessment_id, plan).await)
    }

    /// 通过 ID 获取考核（不含备忘录）
    pub async fn get_assessment_by_id_impl(&self, assessment_id: i64) -> Result<Option<Assessment>> {
        let row = Assessments::find_by_id(assessment_id)
            .select_only()
            .columns(AssessmentRow::columns())
            .into_model::<AssessmentRow>()
            .one(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询考核失败: {e}")))?;

        Ok(row.map(|r| r.into_assessment()))
    }

    /// 阅卷人参与的考核：名单中、讲师或主持人
    pub async fn list_assessments_for_marker_impl(
        &self,
        marker_email: &str,
    ) -> Result<Vec<Assessment>> {
        let roster = Query::select()
            .column(AssessmentMarkerColumn::AssessmentId)
            .from(AssessmentMarkers)
            .and_where(AssessmentMarkerColumn::MarkerEmail.eq(marker_email))
            .to_owned();

        let rows = Assessments::find()
            .select_only()
            .columns(AssessmentRow::columns())
            .filter(
                Condition::any()
                    .add(Column::Id.in_subquery(roster))
                    .add(Column::LecturerEmail.eq(marker_email))
                    // 主持人字段为 JSON，粗筛后再精确比较
                    .add(Column::ModEmail.contains(marker_email)),
            )
            .order_by_desc(Column::CreatedAt)
            .into_model::<AssessmentRow>()
            .all(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询考核列表失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|r| r.into_assessment())
            .filter(|a| {
                a.lecturer_email == marker_email
                    || a.marker_email.contains(marker_email)
                    || a.mod_email.contains(marker_email)
            })
            .collect())
    }

    /// 列出所有考核
    pub async fn list_all_assessments_impl(&self) -> Result<Vec<Assessment>> {
        let rows = Assessments::find()
            .select_only()
            .columns(AssessmentRow::columns())
            .order_by_desc(Column::CreatedAt)
            .into_model::<AssessmentRow>()
            .all(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询考核列表失败: {e}")))?;

        Ok(rows.into_iter().map(|r| r.into_assessment()).collect())
    }

    /// 获取备忘录；考核不存在时返回 NotFound
    pub async fn get_memorandum_impl(&self, assessment_id: i64) -> Result<Option<Vec<u8>>> {
        let memorandum = Assessments::find_by_id(assessment_id)
            .select_only()
            .column(Column::Memorandum)
            .into_tuple::<Option<Vec<u8>>>()
            .one(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询备忘录失败: {e}")))?
            .ok_or_else(|| MaatError::not_found(format!("考核 {assessment_id} 不存在")))?;

        Ok(memorandum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submissions::entities::SubmissionStatus;
    use crate::storage::sea_orm_storage::testing::{
        bring_table_online, create_storage, seed_assessment, seed_submission, take_table_offline,
    };

    fn edit(total_mark: f64, markers: &[&str]) -> UpdateAssessmentRequest {
        UpdateAssessmentRequest {
            marker_email: markers.iter().map(|m| m.to_string()).collect(),
            assessment_name: "Practical 1 (revised)".to_string(),
            module_code: "WRAV301".to_string(),
            mod_email: vec![],
            total_mark,
            memorandum: None,
        }
    }

    #[tokio::test]
    async fn test_create_initializes_counts_and_keeps_memorandum() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &["m@x.ac.za"]).await;

        let assessment = storage.get_assessment_by_id_impl(id).await.unwrap().unwrap();
        assert_eq!(assessment.total_num_submissions, 0);
        assert_eq!(assessment.num_submissions_marked, 0);
        assert_eq!(assessment.lecturer_email, "lecturer@mandela.ac.za");
        assert!(assessment.mod_email.contains("moderator@mandela.ac.za"));

        let memo = storage.get_memorandum_impl(id).await.unwrap();
        assert_eq!(memo.as_deref(), Some(&b"%PDF-1.4 memo"[..]));
    }

    #[tokio::test]
    async fn test_large_memorandum_is_not_truncated() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &[]).await;

        let big: Vec<u8> = (0..(12 * 1024 * 1024)).map(|i| (i % 251) as u8).collect();
        let mut update = edit(100.0, &[]);
        update.memorandum = Some(big.clone());
        storage.update_assessment_impl(id, update).await.unwrap();

        let stored = storage.get_memorandum_impl(id).await.unwrap().unwrap();
        assert_eq!(stored.len(), big.len());
        assert_eq!(stored, big);
    }

    #[tokio::test]
    async fn test_edit_without_scale_change_does_not_rescale() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &["a@x.ac.za"]).await;
        let s = seed_submission(&storage, id, SubmissionStatus::Marked, Some(64.0)).await;

        let report = storage
            .update_assessment_impl(id, edit(100.0, &["b@x.ac.za"]))
            .await
            .unwrap();
        assert!(report.is_none());

        let assessment = storage.get_assessment_by_id_impl(id).await.unwrap().unwrap();
        assert_eq!(assessment.assessment_name, "Practical 1 (revised)");
        assert!(assessment.marker_email.contains("b@x.ac.za"));
        assert!(!assessment.marker_email.contains("a@x.ac.za"));
        // 未提供新备忘录时保留原值
        assert!(storage.get_memorandum_impl(id).await.unwrap().is_some());

        let submission = storage.get_submission_by_id_impl(s).await.unwrap().unwrap();
        assert_eq!(submission.submission_mark, Some(64.0));
    }

    #[tokio::test]
    async fn test_scenario_scale_100_to_45_clamps_to_100() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &[]).await;
        let s1 = seed_submission(&storage, id, SubmissionStatus::Marked, Some(90.0)).await;

        let report = storage
            .update_assessment_impl(id, edit(45.0, &[]))
            .await
            .unwrap()
            .expect("scale change should rescale");
        assert_eq!(report.updated, 1);

        let submission = storage.get_submission_by_id_impl(s1).await.unwrap().unwrap();
        assert_eq!(submission.submission_mark, Some(100.0));
    }

    #[tokio::test]
    async fn test_total_mark_to_zero_is_configuration_error_and_writes_nothing() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &[]).await;
        let s1 = seed_submission(&storage, id, SubmissionStatus::Marked, Some(80.0)).await;

        let err = storage
            .update_assessment_total_mark_impl(id, 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, MaatError::Configuration(_)));

        let err = storage
            .update_assessment_impl(id, edit(0.0, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, MaatError::Configuration(_)));

        let assessment = storage.get_assessment_by_id_impl(id).await.unwrap().unwrap();
        assert_eq!(assessment.total_mark, 100.0);
        assert_eq!(assessment.assessment_name, "Practical 1");
        let submission = storage.get_submission_by_id_impl(s1).await.unwrap().unwrap();
        assert_eq!(submission.submission_mark, Some(80.0));
    }

    #[tokio::test]
    async fn test_failed_rescale_read_keeps_old_total_for_retry() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &[]).await;
        let s1 = seed_submission(&storage, id, SubmissionStatus::Marked, Some(40.0)).await;

        take_table_offline(&storage, "submissions").await;
        let err = storage
            .update_assessment_total_mark_impl(id, 80.0)
            .await
            .unwrap_err();
        assert!(matches!(err, MaatError::DatabaseOperation(_)));
        bring_table_online(&storage, "submissions").await;

        // 满分未写入，重试仍按 100 -> 80 重算
        let assessment = storage.get_assessment_by_id_impl(id).await.unwrap().unwrap();
        assert_eq!(assessment.total_mark, 100.0);

        let report = storage
            .update_assessment_total_mark_impl(id, 80.0)
            .await
            .unwrap();
        assert_eq!(report.old_total, 100.0);
        assert_eq!(report.updated, 1);

        let submission = storage.get_submission_by_id_impl(s1).await.unwrap().unwrap();
        assert_eq!(submission.submission_mark, Some(50.0));
    }

    #[tokio::test]
    async fn test_failed_edit_rescale_read_leaves_assessment_untouched() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &["a@x.ac.za"]).await;
        let s1 = seed_submission(&storage, id, SubmissionStatus::Marked, Some(40.0)).await;

        take_table_offline(&storage, "submissions").await;
        let err = storage
            .update_assessment_impl(id, edit(80.0, &["b@x.ac.za"]))
            .await
            .unwrap_err();
        assert!(matches!(err, MaatError::DatabaseOperation(_)));
        bring_table_online(&storage, "submissions").await;

        let assessment = storage.get_assessment_by_id_impl(id).await.unwrap().unwrap();
        assert_eq!(assessment.total_mark, 100.0);
        assert_eq!(assessment.assessment_name, "Practical 1");
        assert!(assessment.marker_email.contains("a@x.ac.za"));

        let report = storage
            .update_assessment_impl(id, edit(80.0, &["b@x.ac.za"]))
            .await
            .unwrap()
            .expect("scale change should rescale");
        assert_eq!(report.updated, 1);
        let submission = storage.get_submission_by_id_impl(s1).await.unwrap().unwrap();
        assert_eq!(submission.submission_mark, Some(50.0));
    }

    #[tokio::test]
    async fn test_rescale_from_zero_total_is_configuration_error() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 0.0, &[]).await;

        let err = storage
            .update_assessment_total_mark_impl(id, 50.0)
            .await
            .unwrap_err();
        assert!(matches!(err, MaatError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_total_mark_rescales_marks() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &[]).await;
        let s1 = seed_submission(&storage, id, SubmissionStatus::Marked, Some(40.0)).await;

        let report = storage.update_assessment_total_mark_impl(id, 80.0).await.unwrap();
        assert!(report.is_complete());
        assert_eq!(report.updated, 1);

        let submission = storage.get_submission_by_id_impl(s1).await.unwrap().unwrap();
        assert_eq!(submission.submission_mark, Some(50.0));
    }

    #[tokio::test]
    async fn test_same_total_is_a_no_op() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &[]).await;
        seed_submission(&storage, id, SubmissionStatus::Marked, Some(40.0)).await;

        let report = storage.update_assessment_total_mark_impl(id, 100.0).await.unwrap();
        assert_eq!(report.updated, 0);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_list_for_marker_covers_roster_lecturer_and_moderator() {
        let storage = create_storage().await;
        let on_roster = seed_assessment(&storage, 100.0, &["m_1@x.ac.za"]).await;
        let elsewhere = seed_assessment(&storage, 100.0, &["other@x.ac.za"]).await;

        let ids = |items: Vec<Assessment>| items.into_iter().map(|a| a.id).collect::<Vec<_>>();

        let mine = storage
            .list_assessments_for_marker_impl("m_1@x.ac.za")
            .await
            .unwrap();
        assert_eq!(ids(mine), vec![on_roster]);

        // LIKE 的通配符不会带来误匹配
        let none = storage
            .list_assessments_for_marker_impl("m%1@x.ac.za")
            .await
            .unwrap();
        assert!(none.is_empty());

        let lecturer = storage
            .list_assessments_for_marker_impl("lecturer@mandela.ac.za")
            .await
            .unwrap();
        assert_eq!(lecturer.len(), 2);

        let moderator = storage
            .list_assessments_for_marker_impl("moderator@mandela.ac.za")
            .await
            .unwrap();
        let mut moderated = ids(moderator);
        moderated.sort();
        assert_eq!(moderated, vec![on_roster, elsewhere]);
    }

    #[tokio::test]
    async fn test_missing_assessment() {
        let storage = create_storage().await;
        assert!(storage.get_assessment_by_id_impl(1).await.unwrap().is_none());
        assert!(matches!(
            storage.get_memorandum_impl(1).await,
            Err(MaatError::NotFound(_))
        ));
        assert!(matches!(
            storage.update_assessment_impl(1, edit(100.0, &[])).await,
            Err(MaatError::NotFound(_))
        ));
        assert!(matches!(
            storage.update_assessment_total_mark_impl(1, 50.0).await,
            Err(MaatError::NotFound(_))
        ));
    }
}
