use sea_orm_migration::prelude::*;

use crate::m20240415_000001_create_tables::{
    AssessmentMarkers, Assessments, Questions, Submissions,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 同一考核下阅卷人唯一
        manager
            .create_index(
                Index::create()
                    .name("idx_assessment_markers_unique")
                    .table(AssessmentMarkers::Table)
                    .col(AssessmentMarkers::AssessmentId)
                    .col(AssessmentMarkers::MarkerEmail)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // 同一提交下题目唯一
        manager
            .create_index(
                Index::create()
                    .name("idx_questions_submission_text")
                    .table(Questions::Table)
                    .col(Questions::SubmissionId)
                    .col(Questions::QuestionText)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // 聚合计数按考核 + 状态查询
        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_assessment_status")
                    .table(Submissions::Table)
                    .col(Submissions::AssessmentId)
                    .col(Submissions::SubmissionStatus)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assessments_lecturer")
                    .table(Assessments::Table)
                    .col(Assessments::LecturerEmail)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_assessments_lecturer")
                    .table(Assessments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_submissions_assessment_status")
                    .table(Submissions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_questions_submission_text")
                    .table(Questions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_assessment_markers_unique")
                    .table(AssessmentMarkers::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
