//! 提交实体

use sea_orm::FromQueryResult;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assessment_id: i64,
    pub student_num: String,
    pub student_name: String,
    pub student_surname: String,
    pub submission_status: String,
    pub submission_mark: Option<f64>,
    #[sea_orm(column_type = "Blob", nullable)]
    pub submission_pdf: Option<Vec<u8>>,
    #[sea_orm(column_type = "Blob", nullable)]
    pub marked_submission_pdf: Option<Vec<u8>>,
    pub submission_folder_name: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assessments::Entity",
        from = "Column::AssessmentId",
        to = "super::assessments::Column::Id"
    )]
    Assessment,
    #[sea_orm(has_many = "super::questions::Entity")]
    Questions,
}

impl Related<super::assessments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessment.def()
    }
}

impl Related<super::questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 不含 PDF 的查询行
#[derive(Debug, Clone, FromQueryResult)]
pub struct SubmissionRow {
    pub id: i64,
    pub assessment_id: i64,
    pub student_num: String,
    pub student_name: String,
    pub student_surname: String,
    pub submission_status: String,
    pub submission_mark: Option<f64>,
    pub submission_folder_name: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl SubmissionRow {
    pub fn columns() -> [Column; 10] {
        [
            Column::Id,
            Column::AssessmentId,
            Column::StudentNum,
            Column::StudentName,
            Column::StudentSurname,
            Column::SubmissionStatus,
            Column::SubmissionMark,
            Column::SubmissionFolderName,
            Column::CreatedAt,
            Column::UpdatedAt,
        ]
    }

    pub fn into_submission(self) -> crate::models::submissions::entities::Submission {
        use crate::models::submissions::entities::{Submission, SubmissionStatus};
        use chrono::{DateTime, Utc};

        Submission {
            id: self.id,
            assessment_id: self.assessment_id,
            student_num: self.student_num,
            student_name: self.student_name,
            student_surname: self.student_surname,
            submission_status: self
                .submission_status
                .parse::<SubmissionStatus>()
                .unwrap_or(SubmissionStatus::Unmarked),
            submission_mark: self.submission_mark,
            submission_folder_name: self.submission_folder_name,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
