use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub img: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::profile_case::Entity")]
    ProfileCases,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::profile_case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProfileCases.def()
    }
}

impl Related<super::case_overview::Entity> for Entity {
    fn to() -> RelationDef {
        super::profile_case::Relation::CaseOverview.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::profile_case::Relation::Profile.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
