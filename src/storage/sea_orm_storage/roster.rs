//! 阅卷人名单同步
//!
//! 关联表为准，考核行上的 marker_email 字段为其派生缓存，两者在同一事务内更新。

use super::SeaOrmStorage;
use crate::entity::assessment_markers::{
    ActiveModel as AssessmentMarkerActiveModel, Column as AssessmentMarkerColumn,
    Entity as AssessmentMarkers,
};
use crate::entity::assessments::{Column as AssessmentColumn, Entity as Assessments};
use crate::errors::{MaatError, Result};
use crate::models::assessments::entities::{EmailSet, RosterChange};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{debug, info};

/// 考核是否存在
pub(crate) async fn assessment_exists<C: ConnectionTrait>(conn: &C, assessment_id: i64) -> Result<bool> {
    let count = Assessments::find_by_id(assessment_id)
        .count(conn)
        .await
        .map_err(|e| MaatError::database_operation(format!("查询考核失败: {e}")))?;
    Ok(count > 0)
}

/// 读取关联表中的名单
pub(crate) async fn load_roster<C: ConnectionTrait>(conn: &C, assessment_id: i64) -> Result<EmailSet> {
    let rows = AssessmentMarkers::find()
        .filter(AssessmentMarkerColumn::AssessmentId.eq(assessment_id))
        .order_by_asc(AssessmentMarkerColumn::MarkerEmail)
        .all(conn)
        .await
        .map_err(|e| MaatError::database_operation(format!("查询阅卷人名单失败: {e}")))?;

    Ok(rows.into_iter().map(|m| m.marker_email).collect())
}

/// 将名单写回考核行的 marker_email 字段
pub(crate) async fn write_denormalized_roster<C: ConnectionTrait>(
    conn: &C,
    assessment_id: i64,
    roster: &EmailSet,
) -> Result<()> {
    Assessments::update_many()
        .col_expr(AssessmentColumn::MarkerEmail, Expr::value(roster.encode()?))
        .filter(AssessmentColumn::Id.eq(assessment_id))
        .exec(conn)
        .await
        .map_err(|e| MaatError::database_operation(format!("更新考核阅卷人字段失败: {e}")))?;
    Ok(())
}

/// 在给定连接（通常是调用方的事务）上同步名单
///
/// 先删除多余的阅卷人，再插入缺少的，最后重写考核行上的字段。
pub(crate) async fn reconcile_roster_in<C: ConnectionTrait>(
    conn: &C,
    assessment_id: i64,
    desired: &EmailSet,
) -> Result<RosterChange> {
    if !assessment_exists(conn, assessment_id).await? {
        return Err(MaatError::not_found(format!("考核 {assessment_id} 不存在")));
    }

    let current = load_roster(conn, assessment_id).await?;
    let change = RosterChange {
        added: desired.difference(&current),
        removed: current.difference(desired),
    };

    if !change.removed.is_empty() {
        AssessmentMarkers::delete_many()
            .filter(AssessmentMarkerColumn::AssessmentId.eq(assessment_id))
            .filter(AssessmentMarkerColumn::MarkerEmail.is_in(change.removed.clone()))
            .exec(conn)
            .await
            .map_err(|e| MaatError::database_operation(format!("移除阅卷人失败: {e}")))?;
    }

    if !change.added.is_empty() {
        let models = change
            .added
            .iter()
            .map(|email| AssessmentMarkerActiveModel {
                assessment_id: Set(assessment_id),
                marker_email: Set(email.clone()),
                ..Default::default()
            });
        AssessmentMarkers::insert_many(models)
            .exec(conn)
            .await
            .map_err(|e| MaatError::database_operation(format!("添加阅卷人失败: {e}")))?;
    }

    write_denormalized_roster(conn, assessment_id, desired).await?;

    Ok(change)
}

impl SeaOrmStorage {
    /// 同步考核的阅卷人名单（独立事务）
    pub async fn reconcile_roster_impl(
        &self,
        assessment_id: i64,
        desired: &EmailSet,
    ) -> Result<RosterChange> {
        debug!("同步考核 {} 的阅卷人名单: {:?}", assessment_id, desired);

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| MaatError::database_operation(format!("开启事务失败: {e}")))?;

        let change = reconcile_roster_in(&txn, assessment_id, desired).await?;

        txn.commit()
            .await
            .map_err(|e| MaatError::database_operation(format!("提交事务失败: {e}")))?;

        info!(
            "考核 {} 名单同步完成：新增 {}，移除 {}",
            assessment_id,
            change.added.len(),
            change.removed.len()
        );
        Ok(change)
    }

    /// 读取关联表中的名单
    pub async fn list_roster_impl(&self, assessment_id: i64) -> Result<EmailSet> {
        load_roster(&self.db, assessment_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::testing::{create_storage, fail_inserts_on, seed_assessment};

    fn set(items: &[&str]) -> EmailSet {
        items.iter().copied().collect()
    }

    async fn denormalized(storage: &SeaOrmStorage, assessment_id: i64) -> EmailSet {
        storage
            .get_assessment_by_id_impl(assessment_id)
            .await
            .unwrap()
            .unwrap()
            .marker_email
    }

    #[tokio::test]
    async fn test_create_writes_both_representations() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &["m1@x.ac.za", "m2@x.ac.za"]).await;

        let expected = set(&["m1@x.ac.za", "m2@x.ac.za"]);
        assert_eq!(storage.list_roster_impl(id).await.unwrap(), expected);
        assert_eq!(denormalized(&storage, id).await, expected);
    }

    #[tokio::test]
    async fn test_reconcile_converges_to_desired_set() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &["a@x.ac.za", "b@x.ac.za"]).await;

        let desired = set(&["b@x.ac.za", "c@x.ac.za"]);
        let change = storage.reconcile_roster_impl(id, &desired).await.unwrap();

        assert_eq!(change.added, vec!["c@x.ac.za"]);
        assert_eq!(change.removed, vec!["a@x.ac.za"]);
        assert_eq!(storage.list_roster_impl(id).await.unwrap(), desired);
        assert_eq!(denormalized(&storage, id).await, desired);
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &["a@x.ac.za"]).await;

        let desired = set(&["a@x.ac.za", "d@x.ac.za"]);
        storage.reconcile_roster_impl(id, &desired).await.unwrap();
        let second = storage.reconcile_roster_impl(id, &desired).await.unwrap();

        assert!(second.is_empty());
        assert_eq!(storage.list_roster_impl(id).await.unwrap(), desired);
    }

    #[tokio::test]
    async fn test_reconcile_to_empty_clears_roster() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &["a@x.ac.za", "b@x.ac.za"]).await;

        let change = storage.reconcile_roster_impl(id, &EmailSet::new()).await.unwrap();
        assert_eq!(change.removed.len(), 2);
        assert!(storage.list_roster_impl(id).await.unwrap().is_empty());
        assert!(denormalized(&storage, id).await.is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_failure_rolls_back_removals() {
        let storage = create_storage().await;
        let id = seed_assessment(&storage, 100.0, &["a@x.ac.za"]).await;
        fail_inserts_on(&storage, "assessment_markers").await;

        let err = storage
            .reconcile_roster_impl(id, &set(&["b@x.ac.za"]))
            .await
            .unwrap_err();
        assert!(matches!(err, MaatError::DatabaseOperation(_)));

        // 删除 a 已执行，但事务回滚后两种表示都保持原样
        let original = set(&["a@x.ac.za"]);
        assert_eq!(storage.list_roster_impl(id).await.unwrap(), original);
        assert_eq!(denormalized(&storage, id).await, original);
    }

    #[tokio::test]
    async fn test_reconcile_unknown_assessment_is_not_found() {
        let storage = create_storage().await;
        let err = storage
            .reconcile_roster_impl(404, &set(&["a@x.ac.za"]))
            .await
            .unwrap_err();
        assert!(matches!(err, MaatError::NotFound(_)));
    }
}
