//! 考核实体

use sea_orm::FromQueryResult;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assessments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub module_code: String,
    pub assessment_name: String,
    pub lecturer_email: String,
    // 主持人列表，JSON 数组
    #[sea_orm(column_type = "Text")]
    pub mod_email: String,
    // 阅卷人列表，JSON 数组；assessment_markers 表的派生缓存
    #[sea_orm(column_type = "Text")]
    pub marker_email: String,
    pub total_mark: f64,
    pub total_num_submissions: i64,
    pub num_submissions_marked: i64,
    #[sea_orm(column_type = "Blob", nullable)]
    pub memorandum: Option<Vec<u8>>,
    pub assessment_type: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,
    #[sea_orm(has_many = "super::assessment_markers::Entity")]
    AssessmentMarkers,
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl Related<super::assessment_markers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssessmentMarkers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 不含备忘录的查询行，列表与详情都不需要加载大对象
#[derive(Debug, Clone, FromQueryResult)]
pub struct AssessmentRow {
    pub id: i64,
    pub module_code: String,
    pub assessment_name: String,
    pub lecturer_email: String,
    pub mod_email: String,
    pub marker_email: String,
    pub total_mark: f64,
    pub total_num_submissions: i64,
    pub num_submissions_marked: i64,
    pub assessment_type: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl AssessmentRow {
    /// 需要查询的列，与结构体字段一一对应
    pub fn columns() -> [Column; 12] {
        [
            Column::Id,
            Column::ModuleCode,
            Column::AssessmentName,
            Column::LecturerEmail,
            Column::ModEmail,
            Column::MarkerEmail,
            Column::TotalMark,
            Column::TotalNumSubmissions,
            Column::NumSubmissionsMarked,
            Column::AssessmentType,
            Column::CreatedAt,
            Column::UpdatedAt,
        ]
    }

    pub fn into_assessment(self) -> crate::models::assessments::entities::Assessment {
        use crate::models::assessments::entities::{Assessment, EmailSet};
        use chrono::{DateTime, Utc};

        Assessment {
            id: self.id,
            module_code: self.module_code,
            assessment_name: self.assessment_name,
            lecturer_email: self.lecturer_email,
            mod_email: EmailSet::decode_lossy(&self.mod_email),
            marker_email: EmailSet::decode_lossy(&self.marker_email),
            total_mark: self.total_mark,
            total_num_submissions: self.total_num_submissions,
            num_submissions_marked: self.num_submissions_marked,
            assessment_type: self.assessment_type,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
