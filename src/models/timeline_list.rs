use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "timeline_lists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// One list per case
    #[sea_orm(unique)]
    pub case_id: i64,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::case_overview::Entity",
        from = "Column::CaseId",
        to = "super::case_overview::Column::Id"
    )]
    CaseOverview,
    #[sea_orm(has_many = "super::timeline_entry::Entity")]
    Entries,
}

impl Related<super::case_overview::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CaseOverview.def()
    }
}

impl Related<super::timeline_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
