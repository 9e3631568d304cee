use sea_orm::entity::prelude::*;
use sea_orm::Iterable;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "case_overviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub case_number: String,
    /// Owning admin
    pub user_id: i64,
    pub client_user_id: i64,
    pub client_name: String,
    pub title: Option<String>,
    pub case_type: CaseType,
    pub case_status: CaseStatus,
    pub court_date: Option<Date>,
    pub note: Option<String>,
    pub asset_list_id: Option<i64>,
    pub timeline_list_id: Option<i64>,
    /// Court-date reminder already sent for the current court date
    pub is_mail_sent: bool,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::asset_list::Entity")]
    AssetList,
    #[sea_orm(has_one = "super::timeline_list::Entity")]
    TimelineList,
}

impl Related<super::asset_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssetList.def()
    }
}

impl Related<super::timeline_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimelineList.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Kind of legal matter
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum CaseType {
    #[sea_orm(string_value = "Traffic_Violation")]
    #[serde(rename = "Traffic_Violation")]
    TrafficViolation,
    #[sea_orm(string_value = "License_Suspension")]
    #[serde(rename = "License_Suspension")]
    LicenseSuspension,
    #[sea_orm(string_value = "Reckless_Driving")]
    #[serde(rename = "Reckless_Driving")]
    RecklessDriving,
    #[sea_orm(string_value = "Hit_and_Run")]
    #[serde(rename = "Hit_and_Run")]
    HitAndRun,
    #[sea_orm(string_value = "Driving_without_license")]
    #[serde(rename = "Driving_without_license")]
    DrivingWithoutLicense,
    #[sea_orm(string_value = "Parking_Violation")]
    #[serde(rename = "Parking_Violation")]
    ParkingViolation,
}

impl std::fmt::Display for CaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_value())
    }
}

/// Lifecycle state of a case
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum CaseStatus {
    #[sea_orm(string_value = "Pending")]
    #[serde(rename = "Pending")]
    Pending,
    #[sea_orm(string_value = "In_Progress")]
    #[serde(rename = "In_Progress")]
    InProgress,
    #[sea_orm(string_value = "Letter_sent_to_insurance")]
    #[serde(rename = "Letter_sent_to_insurance")]
    LetterSentToInsurance,
    #[sea_orm(string_value = "Closed")]
    #[serde(rename = "Closed")]
    Closed,
}

impl CaseStatus {
    /// Case-insensitive parse, used by list filters
    pub fn parse(s: &str) -> Option<Self> {
        Self::iter().find(|st| st.to_value().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(CaseStatus::parse("in_progress"), Some(CaseStatus::InProgress));
        assert_eq!(CaseStatus::parse("CLOSED"), Some(CaseStatus::Closed));
        assert_eq!(CaseStatus::parse("archived"), None);
    }

    #[test]
    fn test_serde_uses_stored_spelling() {
        let json = serde_json::to_string(&CaseStatus::LetterSentToInsurance).unwrap();
        assert_eq!(json, "\"Letter_sent_to_insurance\"");

        let parsed: CaseType = serde_json::from_str("\"Hit_and_Run\"").unwrap();
        assert_eq!(parsed, CaseType::HitAndRun);
        assert_eq!(parsed.to_value(), "Hit_and_Run");
    }
}
