//! 阅卷人实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "markers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub marker_email: String,
    pub name: String,
    pub surname: String,
    pub password_hash: String,
    pub marker_role: String,
    pub marking_style: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_marker(self) -> crate::models::markers::entities::Marker {
        use crate::models::markers::entities::{Marker, MarkerRole, MarkingStyle};
        use chrono::{DateTime, Utc};

        Marker {
            marker_email: self.marker_email,
            name: self.name,
            surname: self.surname,
            password_hash: self.password_hash,
            marker_role: self
                .marker_role
                .parse::<MarkerRole>()
                .unwrap_or(MarkerRole::Demi),
            marking_style: self
                .marking_style
                .parse::<MarkingStyle>()
                .unwrap_or(MarkingStyle::TickPerMark),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
