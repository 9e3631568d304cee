use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One immutable audit line on a case
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "timeline_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub timeline_list_id: i64,
    pub title: String,
    pub description: String,
    pub date: DateTimeUtc,
    /// JSON array of asset URLs referenced by this entry
    pub asset_urls: Json,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::timeline_list::Entity",
        from = "Column::TimelineListId",
        to = "super::timeline_list::Column::Id"
    )]
    TimelineList,
}

impl Related<super::timeline_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimelineList.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn urls(&self) -> Vec<String> {
        serde_json::from_value(self.asset_urls.clone()).unwrap_or_default()
    }
}
