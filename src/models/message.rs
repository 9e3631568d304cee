use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A chat message; rows are never edited after insert except for the `seen` flag
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub text: Option<String>,
    pub file_url: Option<String>,
    pub file_type: Option<String>,
    pub seen: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
