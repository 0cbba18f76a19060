//! 考核级联删除
//!
//! 依次删除：逐题评分 → 提交 → 阅卷人名单 → 考核行，全部在一个事务内。
//! 任一步失败即中止，事务回滚，错误中带有失败的步骤。

use super::SeaOrmStorage;
use super::roster::assessment_exists;
use crate::entity::assessment_markers::{
    Column as AssessmentMarkerColumn, Entity as AssessmentMarkers,
};
use crate::entity::assessments::Entity as Assessments;
use crate::entity::questions::{Column as QuestionColumn, Entity as Questions};
use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};
use crate::errors::{CascadeError, CascadeStep};
use sea_orm::sea_query::Query;
use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter, TransactionTrait};
use tracing::{debug, error, info};

/// 将数据库错误标记为某一步骤的失败
fn at(step: CascadeStep) -> impl Fn(DbErr) -> CascadeError {
    move |e| CascadeError::new(step, e)
}

impl SeaOrmStorage {
    /// 级联删除考核，考核不存在时返回 `Ok(false)`
    pub async fn delete_assessment_impl(&self, assessment_id: i64) -> Result<bool, CascadeError> {
        debug!("开始级联删除考核 {}", assessment_id);

        let result = self.delete_assessment_steps(assessment_id).await;
        match &result {
            Ok(true) => info!("考核 {} 已级联删除", assessment_id),
            Ok(false) => debug!("考核 {} 不存在，无需删除", assessment_id),
            Err(e) => error!("考核 {} {}", assessment_id, e),
        }
        result
    }

    async fn delete_assessment_steps(&self, assessment_id: i64) -> Result<bool, CascadeError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(at(CascadeStep::Begin))?;

        if !assessment_exists(&txn, assessment_id)
            .await
            .map_err(|e| CascadeError::new(CascadeStep::Begin, e))?
        {
            return Ok(false);
        }

        let submission_ids = Query::select()
            .column(SubmissionColumn::Id)
            .from(Submissions)
            .and_where(SubmissionColumn::AssessmentId.eq(assessment_id))
            .to_owned();

        Questions::delete_many()
            .filter(QuestionColumn::SubmissionId.in_subquery(submission_ids))
            .exec(&txn)
            .await
            .map_err(at(CascadeStep::Questions))?;

        Submissions::delete_many()
            .filter(SubmissionColumn::AssessmentId.eq(assessment_id))
            .exec(&txn)
            .await
            .map_err(at(CascadeStep::Submissions))?;

        AssessmentMarkers::delete_many()
            .filter(AssessmentMarkerColumn::AssessmentId.eq(assessment_id))
            .exec(&txn)
            .await
            .map_err(at(CascadeStep::Roster))?;

        Assessments::delete_by_id(assessment_id)
            .exec(&txn)
            .await
            .map_err(at(CascadeStep::Assessment))?;

        txn.commit().await.map_err(at(CascadeStep::Commit))?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submissions::entities::SubmissionStatus;
    use crate::storage::sea_orm_storage::testing::{
        create_storage, fail_deletes_on, seed_assessment, seed_submission,
    };
    use sea_orm::PaginatorTrait;

    async fn seed_graded(storage: &SeaOrmStorage) -> (i64, Vec<i64>) {
        let id = seed_assessment(storage, 100.0, &["a@x.ac.za", "b@x.ac.za"]).await;
        let mut submissions = Vec::new();
        for _ in 0..3 {
            let s = seed_submission(storage, id, SubmissionStatus::Marked, Some(50.0)).await;
            storage.set_question_mark_impl(s, "Q1", 3.0).await.unwrap();
            storage.set_question_mark_impl(s, "Q2", 4.5).await.unwrap();
            submissions.push(s);
        }
        (id, submissions)
    }

    async fn question_count(storage: &SeaOrmStorage) -> u64 {
        Questions::find().count(&storage.db).await.unwrap()
    }

    #[tokio::test]
    async fn test_cascade_removes_every_dependent_row() {
        let storage = create_storage().await;
        let (id, _) = seed_graded(&storage).await;
        let (survivor, survivor_subs) = seed_graded(&storage).await;

        assert!(storage.delete_assessment_impl(id).await.unwrap());

        assert!(storage.get_assessment_by_id_impl(id).await.unwrap().is_none());
        assert!(storage.list_submissions_impl(id).await.unwrap().is_empty());
        assert!(storage.list_roster_impl(id).await.unwrap().is_empty());

        // 其他考核不受影响
        assert_eq!(question_count(&storage).await, 6);
        assert_eq!(storage.list_submissions_impl(survivor).await.unwrap().len(), 3);
        assert_eq!(storage.list_roster_impl(survivor).await.unwrap().len(), 2);
        assert_eq!(
            storage
                .list_question_marks_impl(survivor_subs[0])
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_missing_assessment_returns_false() {
        let storage = create_storage().await;
        assert!(!storage.delete_assessment_impl(77).await.unwrap());
    }

    #[tokio::test]
    async fn test_question_failure_aborts_before_submissions() {
        let storage = create_storage().await;
        let (id, _) = seed_graded(&storage).await;
        fail_deletes_on(&storage, "questions").await;

        let err = storage.delete_assessment_impl(id).await.unwrap_err();
        assert_eq!(err.step, CascadeStep::Questions);

        assert_eq!(question_count(&storage).await, 6);
        assert_eq!(storage.list_submissions_impl(id).await.unwrap().len(), 3);
        assert_eq!(storage.list_roster_impl(id).await.unwrap().len(), 2);
        assert!(storage.get_assessment_by_id_impl(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_submission_failure_rolls_back_questions() {
        let storage = create_storage().await;
        let (id, submissions) = seed_graded(&storage).await;
        fail_deletes_on(&storage, "submissions").await;

        let err = storage.delete_assessment_impl(id).await.unwrap_err();
        assert_eq!(err.step, CascadeStep::Submissions);
        assert!(err.to_string().contains("submissions"));

        // 题目已删除但随事务回滚，名单与考核未被触及
        assert_eq!(question_count(&storage).await, 6);
        assert_eq!(
            storage
                .list_question_marks_impl(submissions[0])
                .await
                .unwrap()
                .len(),
            2
        );
        assert_eq!(storage.list_submissions_impl(id).await.unwrap().len(), 3);
        assert_eq!(storage.list_roster_impl(id).await.unwrap().len(), 2);
        assert!(storage.get_assessment_by_id_impl(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_roster_failure_rolls_back_earlier_steps() {
        let storage = create_storage().await;
        let (id, _) = seed_graded(&storage).await;
        fail_deletes_on(&storage, "assessment_markers").await;

        let err = storage.delete_assessment_impl(id).await.unwrap_err();
        assert_eq!(err.step, CascadeStep::Roster);
        assert!(err.to_string().contains("roster"));

        // 前两步已执行但随事务回滚
        assert_eq!(question_count(&storage).await, 6);
        assert_eq!(storage.list_submissions_impl(id).await.unwrap().len(), 3);
        assert!(storage.get_assessment_by_id_impl(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_assessment_row_failure_is_named() {
        let storage = create_storage().await;
        let (id, _) = seed_graded(&storage).await;
        fail_deletes_on(&storage, "assessments").await;

        let err = storage.delete_assessment_impl(id).await.unwrap_err();
        assert_eq!(err.step, CascadeStep::Assessment);
        assert_eq!(storage.list_submissions_impl(id).await.unwrap().len(), 3);
    }
}
