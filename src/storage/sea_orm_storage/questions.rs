//! 逐题评分存储操作

use super::SeaOrmStorage;
use crate::entity::questions::{ActiveModel, Column, Entity as Questions};
use crate::entity::submissions::Entity as Submissions;
use crate::errors::{MaatError, Result};
use crate::models::questions::entities::QuestionMark;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 列出提交的逐题评分
    pub async fn list_question_marks_impl(&self, submission_id: i64) -> Result<Vec<QuestionMark>> {
        let rows = Questions::find()
            .filter(Column::SubmissionId.eq(submission_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询逐题评分失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_question_mark()).collect())
    }

    /// 设置某题得分，同一提交下按题目文本覆盖
    pub async fn set_question_mark_impl(
        &self,
        submission_id: i64,
        question_text: &str,
        mark_allocation: f64,
    ) -> Result<QuestionMark> {
        let question_text = question_text.trim();
        if question_text.is_empty() {
            return Err(MaatError::validation("题目不能为空"));
        }
        if !mark_allocation.is_finite() || mark_allocation < 0.0 {
            return Err(MaatError::validation(format!(
                "题目得分无效: {mark_allocation}"
            )));
        }

        let exists = Submissions::find_by_id(submission_id)
            .count(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询提交失败: {e}")))?;
        if exists == 0 {
            return Err(MaatError::not_found(format!("提交 {submission_id} 不存在")));
        }

        let model = ActiveModel {
            submission_id: Set(submission_id),
            question_text: Set(question_text.to_string()),
            mark_allocation: Set(mark_allocation),
            ..Default::default()
        };

        Questions::insert(model)
            .on_conflict(
                OnConflict::columns([Column::SubmissionId, Column::QuestionText])
                    .update_column(Column::MarkAllocation)
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("保存逐题评分失败: {e}")))?;

        let saved = Questions::find()
            .filter(Column::SubmissionId.eq(submission_id))
            .filter(Column::QuestionText.eq(question_text))
            .one(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询逐题评分失败: {e}")))?
            .ok_or_else(|| MaatError::database_operation("逐题评分保存后未找到"))?;

        Ok(saved.into_question_mark())
    }
}
