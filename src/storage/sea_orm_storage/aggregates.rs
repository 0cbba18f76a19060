//! 考核提交计数刷新

use super::SeaOrmStorage;
use super::roster::assessment_exists;
use crate::entity::assessments::{Column as AssessmentColumn, Entity as Assessments};
use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};
use crate::errors::{MaatError, Result};
use crate::models::assessments::entities::AggregateCounts;
use crate::models::submissions::entities::SubmissionStatus;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait};
use tracing::debug;

/// 按提交行重新统计并写回考核行
pub(crate) async fn recalculate_aggregates_in<C: ConnectionTrait>(
    conn: &C,
    assessment_id: i64,
) -> Result<AggregateCounts> {
    if !assessment_exists(conn, assessment_id).await? {
        return Err(MaatError::not_found(format!("考核 {assessment_id} 不存在")));
    }

    let total = Submissions::find()
        .filter(SubmissionColumn::AssessmentId.eq(assessment_id))
        .count(conn)
        .await
        .map_err(|e| MaatError::database_operation(format!("统计提交数失败: {e}")))?;

    let marked = Submissions::find()
        .filter(SubmissionColumn::AssessmentId.eq(assessment_id))
        .filter(SubmissionColumn::SubmissionStatus.eq(SubmissionStatus::MARKED))
        .count(conn)
        .await
        .map_err(|e| MaatError::database_operation(format!("统计已批改数失败: {e}")))?;

    let counts = AggregateCounts {
        total_num_submissions: total as i64,
        num_submissions_marked: marked as i64,
    };

    Assessments::update_many()
        .col_expr(
            AssessmentColumn::TotalNumSubmissions,
            Expr::value(counts.total_num_submissions),
        )
        .col_expr(
            AssessmentColumn::NumSubmissionsMarked,
            Expr::value(counts.num_submissions_marked),
        )
        .filter(AssessmentColumn::Id.eq(assessment_id))
        .exec(conn)
        .await
        .map_err(|e| MaatError::database_operation(format!("更新考核计数失败: {e}")))?;

    debug!(
        "考核 {} 计数: 共 {}，已批改 {}",
        assessment_id, counts.total_num_submissions, counts.num_submissions_marked
    );
    Ok(counts)
}

impl SeaOrmStorage {
    /// 刷新考核计数（独立事务）
    pub async fn recalculate_aggregates_impl(&self, assessment_id: i64) -> Result<AggregateCounts> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| MaatError::database_operation(format!("开启事务失败: {e}")))?;

        let counts = recalculate_aggregates_in(&txn, assessment_id).await?;

        txn.commit()
            .await
            .map_err(|e| MaatError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::testing::{create_storage, seed_assessment, seed_submission};

    async fn cached_counts(storage: &SeaOrmStorage, assessment_id: i64) -> AggregateCounts {
        let assessment = storage
            .get_assessment_by_id_impl(assessment_id)
            .await
            .unwrap()
            .unwrap();
        AggregateCounts {
            total_num_submissions: assessment.total_num_submissions,
            num_submissions_marked: assessment.num_submissions_marked,
        }
    }

    #[tokio::test]
    async fn test_empty_assessment_counts_are_zero() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &[]).await;

        let counts = storage.recalculate_aggregates_impl(id).await.unwrap();
        assert_eq!(counts.total_num_submissions, 0);
        assert_eq!(counts.num_submissions_marked, 0);
        assert_eq!(cached_counts(&storage, id).await, counts);
    }

    #[tokio::test]
    async fn test_counts_follow_inserts_and_status_changes() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &[]).await;
        let other = seed_assessment(&storage, 100.0, &[]).await;

        let s1 = seed_submission(&storage, id, SubmissionStatus::Unmarked, None).await;
        let s2 = seed_submission(&storage, id, SubmissionStatus::Marked, Some(70.0)).await;
        seed_submission(&storage, id, SubmissionStatus::InProgress, None).await;
        seed_submission(&storage, other, SubmissionStatus::Marked, Some(50.0)).await;

        // 新增提交后计数已同步刷新
        assert_eq!(
            cached_counts(&storage, id).await,
            AggregateCounts {
                total_num_submissions: 3,
                num_submissions_marked: 1
            }
        );

        storage
            .update_submission_status_impl(s1, SubmissionStatus::Marked)
            .await
            .unwrap();
        storage
            .update_submission_status_impl(s2, SubmissionStatus::Moderated)
            .await
            .unwrap();

        assert_eq!(
            cached_counts(&storage, id).await,
            AggregateCounts {
                total_num_submissions: 3,
                num_submissions_marked: 1
            }
        );
        assert_eq!(cached_counts(&storage, other).await.total_num_submissions, 1);
    }

    #[tokio::test]
    async fn test_recalculate_is_idempotent_and_repairs_drift() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &[]).await;
        seed_submission(&storage, id, SubmissionStatus::Marked, Some(55.0)).await;

        // 人为破坏缓存计数
        Assessments::update_many()
            .col_expr(AssessmentColumn::TotalNumSubmissions, Expr::value(42i64))
            .filter(AssessmentColumn::Id.eq(id))
            .exec(&storage.db)
            .await
            .unwrap();

        let first = storage.recalculate_aggregates_impl(id).await.unwrap();
        let second = storage.recalculate_aggregates_impl(id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total_num_submissions, 1);
        assert_eq!(first.num_submissions_marked, 1);
    }

    #[tokio::test]
    async fn test_recalculate_unknown_assessment_is_not_found() {
        let storage = create_storage().await;
        let err = storage.recalculate_aggregates_impl(9).await.unwrap_err();
        assert!(matches!(err, MaatError::NotFound(_)));
    }
}
