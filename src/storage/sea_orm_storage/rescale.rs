//! 满分调整后的分数重算

use super::SeaOrmStorage;
use crate::entity::submissions::{Column, Entity as Submissions};
use crate::errors::{MaatError, Result};
use crate::models::assessments::entities::{RescaleFailure, RescaleReport};
use futures_util::future::join_all;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use tracing::{info, warn};

/// 按新满分重算单个分数：`mark * old / new`，限制在 [0, 100]，四舍五入到两位小数
pub fn rescale_mark(mark: f64, old_total: f64, new_total: f64) -> f64 {
    let rescaled = (mark * old_total / new_total).clamp(0.0, 100.0);
    // f64::round 为远离零的四舍五入
    (rescaled * 100.0).round() / 100.0
}

/// 检查满分调整是否可执行
pub(crate) fn validate_scale(old_total: f64, new_total: f64) -> Result<()> {
    if !old_total.is_finite() || old_total == 0.0 {
        return Err(MaatError::configuration(format!(
            "原满分为 {old_total}，无法按比例重算"
        )));
    }
    if !new_total.is_finite() || new_total <= 0.0 {
        return Err(MaatError::configuration(format!(
            "新满分必须为正数，收到 {new_total}"
        )));
    }
    Ok(())
}

/// 重算计划：在满分写入前读取，与满分更新处于同一事务
#[derive(Debug)]
pub(crate) struct RescalePlan {
    old_total: f64,
    new_total: f64,
    pending: Vec<(i64, f64)>,
    skipped: usize,
}

/// 读取考核下的提交并计算新分数
///
/// 必须在写入新满分之前、同一事务内调用；读取失败时事务回滚，满分保持不变。
pub(crate) async fn plan_rescale<C: ConnectionTrait>(
    conn: &C,
    assessment_id: i64,
    old_total: f64,
    new_total: f64,
) -> Result<RescalePlan> {
    let rows: Vec<(i64, Option<f64>)> = Submissions::find()
        .select_only()
        .column(Column::Id)
        .column(Column::SubmissionMark)
        .filter(Column::AssessmentId.eq(assessment_id))
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| MaatError::database_operation(format!("查询待重算提交失败: {e}")))?;

    let mut plan = RescalePlan {
        old_total,
        new_total,
        pending: Vec::with_capacity(rows.len()),
        skipped: 0,
    };
    for (submission_id, mark) in rows {
        match mark {
            Some(mark) if mark.is_finite() => plan
                .pending
                .push((submission_id, rescale_mark(mark, old_total, new_total))),
            _ => plan.skipped += 1,
        }
    }
    Ok(plan)
}

impl SeaOrmStorage {
    /// 写回重算后的分数
    ///
    /// 每个提交独立更新，失败记录在报告中，不影响其他提交。
    /// 调用方需已提交新满分并持有考核锁。
    pub(crate) async fn apply_rescale(&self, assessment_id: i64, plan: RescalePlan) -> RescaleReport {
        let mut report = RescaleReport {
            old_total: plan.old_total,
            new_total: plan.new_total,
            skipped: plan.skipped,
            ..Default::default()
        };

        let now = chrono::Utc::now().timestamp();
        let outcomes = join_all(plan.pending.into_iter().map(|(submission_id, rescaled)| async move {
            let outcome = Submissions::update_many()
                .col_expr(Column::SubmissionMark, Expr::value(rescaled))
                .col_expr(Column::UpdatedAt, Expr::value(now))
                .filter(Column::Id.eq(submission_id))
                .exec(&self.db)
                .await;
            (submission_id, outcome)
        }))
        .await;

        for (submission_id, outcome) in outcomes {
            match outcome {
                Ok(_) => report.updated += 1,
                Err(e) => {
                    warn!(
                        "考核 {} 的提交 {} 分数重算失败: {}",
                        assessment_id, submission_id, e
                    );
                    report.failed.push(RescaleFailure {
                        submission_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "考核 {} 满分 {} -> {}：更新 {}，跳过 {}，失败 {}",
            assessment_id,
            report.old_total,
            report.new_total,
            report.updated,
            report.skipped,
            report.failed.len()
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submissions::entities::SubmissionStatus;
    use crate::storage::sea_orm_storage::testing::{
        create_storage, fail_updates_of_submission, seed_assessment, seed_submission,
    };

    #[test]
    fn test_rescale_formula_keeps_raw_points() {
        // 40 分（百分制）在满分 50 下为 80 分
        assert_eq!(rescale_mark(40.0, 100.0, 50.0), 80.0);
        assert_eq!(rescale_mark(80.0, 50.0, 100.0), 40.0);
        assert_eq!(rescale_mark(0.0, 100.0, 37.0), 0.0);
    }

    #[test]
    fn test_rescale_clamps_into_percentage_range() {
        // 90 * 100 / 45 = 200
        assert_eq!(rescale_mark(90.0, 100.0, 45.0), 100.0);
        assert_eq!(rescale_mark(80.0, 100.0, 50.0), 100.0);
        assert_eq!(rescale_mark(-12.0, 100.0, 50.0), 0.0);
    }

    #[test]
    fn test_rescale_rounds_to_two_decimals() {
        // 10 * 100 / 30 = 33.333...
        assert_eq!(rescale_mark(10.0, 100.0, 30.0), 33.33);
        // 20 * 100 / 30 = 66.666...
        assert_eq!(rescale_mark(20.0, 100.0, 30.0), 66.67);
        assert_eq!(rescale_mark(12.5, 1.0, 1.0), 12.5);
    }

    #[test]
    fn test_validate_scale() {
        assert!(validate_scale(100.0, 50.0).is_ok());
        assert!(matches!(
            validate_scale(0.0, 50.0),
            Err(MaatError::Configuration(_))
        ));
        assert!(matches!(
            validate_scale(100.0, 0.0),
            Err(MaatError::Configuration(_))
        ));
        assert!(matches!(
            validate_scale(100.0, -5.0),
            Err(MaatError::Configuration(_))
        ));
        assert!(matches!(
            validate_scale(100.0, f64::NAN),
            Err(MaatError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_rescale_is_best_effort_per_submission() {
        let storage = create_storage().await;
        let assessment_id = seed_assessment(&storage, 100.0, &[]).await;
        let first =
            seed_submission(&storage, assessment_id, SubmissionStatus::Marked, Some(30.0)).await;
        let broken =
            seed_submission(&storage, assessment_id, SubmissionStatus::Marked, Some(40.0)).await;
        let third =
            seed_submission(&storage, assessment_id, SubmissionStatus::Marked, Some(20.0)).await;
        let unmarked =
            seed_submission(&storage, assessment_id, SubmissionStatus::Unmarked, None).await;

        fail_updates_of_submission(&storage, broken).await;

        let report = storage
            .update_assessment_total_mark_impl(assessment_id, 50.0)
            .await
            .unwrap();

        assert_eq!(report.updated, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].submission_id, broken);
        assert!(!report.is_complete());

        let mark_of = |id| {
            let storage = storage.clone();
            async move {
                storage
                    .get_submission_by_id_impl(id)
                    .await
                    .unwrap()
                    .unwrap()
                    .submission_mark
            }
        };
        assert_eq!(mark_of(first).await, Some(60.0));
        assert_eq!(mark_of(third).await, Some(40.0));
        // 失败的提交保持原分数
        assert_eq!(mark_of(broken).await, Some(40.0));
        assert_eq!(mark_of(unmarked).await, None);

        let assessment = storage
            .get_assessment_by_id_impl(assessment_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(assessment.total_mark, 50.0);
    }
}
