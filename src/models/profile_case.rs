use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ordered link from a client profile to a case it owns
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile_cases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub profile_id: i64,
    pub case_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::ProfileId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Profile,
    #[sea_orm(
        belongs_to = "super::case_overview::Entity",
        from = "Column::CaseId",
        to = "super::case_overview::Column::Id",
        on_delete = "Cascade"
    )]
    CaseOverview,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::case_overview::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CaseOverview.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
