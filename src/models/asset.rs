use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub asset_list_id: i64,
    pub url: String,
    pub name: String,
    pub size: i64,
    pub upload_date: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::asset_list::Entity",
        from = "Column::AssetListId",
        to = "super::asset_list::Column::Id"
    )]
    AssetList,
}

impl Related<super::asset_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssetList.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
