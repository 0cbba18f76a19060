//! 阅卷人存储操作

use super::SeaOrmStorage;
use super::roster::{load_roster, write_denormalized_roster};
use crate::entity::assessment_markers::{
    Column as AssessmentMarkerColumn, Entity as AssessmentMarkers,
};
use crate::entity::markers::{ActiveModel, Column, Entity as Markers};
use crate::errors::{MaatError, Result};
use crate::models::markers::{
    entities::{Marker, MarkerRole},
    requests::{NewMarker, UpdateMarkerRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::info;

impl SeaOrmStorage {
    /// 创建阅卷人
    pub async fn create_marker_impl(&self, marker: NewMarker) -> Result<Marker> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            marker_email: Set(marker.marker_email),
            name: Set(marker.name),
            surname: Set(marker.surname),
            password_hash: Set(marker.password_hash),
            marker_role: Set(marker.marker_role.to_string()),
            marking_style: Set(marker.marking_style.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("创建阅卷人失败: {e}")))?;

        Ok(result.into_marker())
    }

    /// 通过邮箱获取阅卷人
    pub async fn get_marker_by_email_impl(&self, marker_email: &str) -> Result<Option<Marker>> {
        let result = Markers::find_by_id(marker_email.to_string())
            .one(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询阅卷人失败: {e}")))?;

        Ok(result.map(|m| m.into_marker()))
    }

    /// 按角色列出阅卷人，`roles` 为空时列出全部
    pub async fn list_markers_impl(&self, roles: &[MarkerRole]) -> Result<Vec<Marker>> {
        let mut select = Markers::find();

        if !roles.is_empty() {
            select = select.filter(Column::MarkerRole.is_in(roles.iter().map(|r| r.to_string())));
        }

        let markers = select
            .order_by_asc(Column::Surname)
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询阅卷人列表失败: {e}")))?;

        Ok(markers.into_iter().map(|m| m.into_marker()).collect())
    }

    /// 更新阅卷人信息
    pub async fn update_marker_impl(
        &self,
        marker_email: &str,
        update: UpdateMarkerRequest,
    ) -> Result<Option<Marker>> {
        // 先检查阅卷人是否存在
        let existing = self.get_marker_by_email_impl(marker_email).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            marker_email: Set(marker_email.to_string()),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(surname) = update.surname {
            model.surname = Set(surname);
        }

        if let Some(role) = update.marker_role {
            model.marker_role = Set(role.to_string());
        }

        if let Some(style) = update.marking_style {
            model.marking_style = Set(style.to_string());
        }

        // 此处已是哈希值
        if let Some(password) = update.password {
            model.password_hash = Set(password);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("更新阅卷人失败: {e}")))?;

        Ok(Some(result.into_marker()))
    }

    /// 阅卷人所在名单的考核 ID，升序
    pub(crate) async fn marker_assessment_ids(&self, marker_email: &str) -> Result<Vec<i64>> {
        AssessmentMarkers::find()
            .select_only()
            .column(AssessmentMarkerColumn::AssessmentId)
            .filter(AssessmentMarkerColumn::MarkerEmail.eq(marker_email))
            .order_by_asc(AssessmentMarkerColumn::AssessmentId)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询阅卷人名单失败: {e}")))
    }

    /// 删除阅卷人，同时从所有考核名单中移除并重写考核行上的字段
    pub async fn delete_marker_impl(&self, marker_email: &str) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| MaatError::database_operation(format!("开启事务失败: {e}")))?;

        let affected: Vec<i64> = AssessmentMarkers::find()
            .select_only()
            .column(AssessmentMarkerColumn::AssessmentId)
            .filter(AssessmentMarkerColumn::MarkerEmail.eq(marker_email))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询阅卷人名单失败: {e}")))?;

        AssessmentMarkers::delete_many()
            .filter(AssessmentMarkerColumn::MarkerEmail.eq(marker_email))
            .exec(&txn)
            .await
            .map_err(|e| MaatError::database_operation(format!("移除阅卷人名单失败: {e}")))?;

        for assessment_id in &affected {
            let roster = load_roster(&txn, *assessment_id).await?;
            write_denormalized_roster(&txn, *assessment_id, &roster).await?;
        }

        let result = Markers::delete_by_id(marker_email.to_string())
            .exec(&txn)
            .await
            .map_err(|e| MaatError::database_operation(format!("删除阅卷人失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| MaatError::database_operation(format!("提交事务失败: {e}")))?;

        if result.rows_affected > 0 {
            info!(
                "阅卷人 {} 已删除，涉及 {} 个考核",
                marker_email,
                affected.len()
            );
        }
        Ok(result.rows_affected > 0)
    }

    /// 阅卷人总数
    pub async fn count_markers_impl(&self) -> Result<u64> {
        Markers::find()
            .count(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("统计阅卷人失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::markers::entities::MarkingStyle;
    use crate::storage::sea_orm_storage::testing::{create_storage, seed_assessment};

    fn new_marker(email: &str, role: MarkerRole) -> NewMarker {
        NewMarker {
            marker_email: email.to_string(),
            name: "Ayanda".to_string(),
            surname: email.to_string(),
            password_hash: "$argon2id$v=19$stub".to_string(),
            marker_role: role,
            marking_style: MarkingStyle::TickPerMark,
        }
    }

    #[tokio::test]
    async fn test_list_markers_by_role() {
        let storage = create_storage().await;
        storage
            .create_marker_impl(new_marker("l@x.ac.za", MarkerRole::Lecturer))
            .await
            .unwrap();
        storage
            .create_marker_impl(new_marker("d@x.ac.za", MarkerRole::Demi))
            .await
            .unwrap();
        storage
            .create_marker_impl(new_marker("a@x.ac.za", MarkerRole::Admin))
            .await
            .unwrap();

        assert_eq!(storage.list_markers_impl(&[]).await.unwrap().len(), 3);
        let demis = storage.list_markers_impl(&[MarkerRole::Demi]).await.unwrap();
        assert_eq!(demis.len(), 1);
        assert_eq!(demis[0].marker_email, "d@x.ac.za");
        let moderators = storage
            .list_markers_impl(&[MarkerRole::Lecturer, MarkerRole::Admin])
            .await
            .unwrap();
        assert_eq!(moderators.len(), 2);
        assert_eq!(storage.count_markers_impl().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_marker_is_rejected() {
        let storage = create_storage().await;
        storage
            .create_marker_impl(new_marker("d@x.ac.za", MarkerRole::Demi))
            .await
            .unwrap();
        assert!(
            storage
                .create_marker_impl(new_marker("d@x.ac.za", MarkerRole::Lecturer))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_update_marker() {
        let storage = create_storage().await;
        storage
            .create_marker_impl(new_marker("d@x.ac.za", MarkerRole::Demi))
            .await
            .unwrap();

        let updated = storage
            .update_marker_impl(
                "d@x.ac.za",
                UpdateMarkerRequest {
                    marking_style: Some(MarkingStyle::QuestionPerMark),
                    password: Some("$argon2id$v=19$new".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.marking_style, MarkingStyle::QuestionPerMark);
        assert_eq!(updated.marker_role, MarkerRole::Demi);
        assert_eq!(updated.password_hash, "$argon2id$v=19$new");

        assert!(
            storage
                .update_marker_impl("ghost@x.ac.za", UpdateMarkerRequest::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_marker_rewrites_every_roster() {
        let storage = create_storage().await;
        storage
            .create_marker_impl(new_marker("d@x.ac.za", MarkerRole::Demi))
            .await
            .unwrap();
        let first = seed_assessment(&storage, 100.0, &["d@x.ac.za", "e@x.ac.za"]).await;
        let second = seed_assessment(&storage, 100.0, &["d@x.ac.za"]).await;

        assert_eq!(
            storage.marker_assessment_ids("d@x.ac.za").await.unwrap(),
            vec![first, second]
        );
        assert!(storage.delete_marker_impl("d@x.ac.za").await.unwrap());

        for id in [first, second] {
            let roster = storage.list_roster_impl(id).await.unwrap();
            assert!(!roster.contains("d@x.ac.za"));
            let assessment = storage.get_assessment_by_id_impl(id).await.unwrap().unwrap();
            assert_eq!(assessment.marker_email, roster);
        }
        assert!(storage.list_roster_impl(first).await.unwrap().contains("e@x.ac.za"));
        assert!(!storage.delete_marker_impl("d@x.ac.za").await.unwrap());
    }
}
