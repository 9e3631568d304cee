use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::models::case_overview::{self, CaseStatus, CaseType};
use super::PageQuery;
use crate::models::{asset, timeline_entry};

/// Maximum number of files accepted by one upload request
pub const MAX_FILES_PER_REQUEST: usize = 5;

/// Client-supplied description of one uploaded file; url and size come from storage
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssetMeta {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub upload_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCase {
    pub client_user_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub client_name: String,
    pub case_type: CaseType,
    pub case_status: CaseStatus,
    pub court_date: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 5), nested)]
    pub assets: Vec<AssetMeta>,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CasePatch {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub client_name: Option<String>,
    pub case_type: Option<CaseType>,
    pub case_status: Option<CaseStatus>,
    pub court_date: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
    pub client_user_id: Option<i64>,
}

/// How an asset upload names its case
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseTarget {
    CaseId(i64),
    ClientName(String),
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddAssets {
    pub target: CaseTarget,
    #[validate(length(min = 1, max = 5), nested)]
    pub assets: Vec<AssetMeta>,
}

/// Manual timeline note
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TimelineNote {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub asset_urls: Vec<String>,
}

/// Every case mutation the orchestrator accepts
#[derive(Debug, Clone)]
pub enum CaseRequest {
    Create(CreateCase),
    Update { case_id: i64, patch: CasePatch },
    AddAssets(AddAssets),
    AddTimeline { case_id: i64, note: TimelineNote },
}

impl Validate for CaseRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            CaseRequest::Create(req) => req.validate(),
            CaseRequest::Update { patch, .. } => patch.validate(),
            CaseRequest::AddAssets(req) => {
                if let CaseTarget::ClientName(name) = &req.target {
                    if name.trim().is_empty() {
                        let mut errors = ValidationErrors::new();
                        errors.add("target", validator::ValidationError::new("empty_client_name"));
                        return Err(errors);
                    }
                }
                req.validate()
            }
            CaseRequest::AddTimeline { note, .. } => note.validate(),
        }
    }
}

impl CaseRequest {
    /// Asset metadata that must pair 1:1 with uploaded files
    pub fn asset_meta(&self) -> &[AssetMeta] {
        match self {
            CaseRequest::Create(req) => &req.assets,
            CaseRequest::AddAssets(req) => &req.assets,
            _ => &[],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CaseRequest::Create(_) => "create",
            CaseRequest::Update { .. } => "update",
            CaseRequest::AddAssets(_) => "add_assets",
            CaseRequest::AddTimeline { .. } => "add_timeline",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub owner: Option<i64>,
}

impl CaseListQuery {
    pub fn paging(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseSummary {
    pub id: i64,
    pub case_number: String,
    pub user_id: i64,
    pub client_user_id: i64,
    pub client_name: String,
    pub title: Option<String>,
    pub case_type: CaseType,
    pub case_status: CaseStatus,
    pub court_date: Option<NaiveDate>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl From<case_overview::Model> for CaseSummary {
    fn from(c: case_overview::Model) -> Self {
        Self {
            id: c.id,
            case_number: c.case_number,
            user_id: c.user_id,
            client_user_id: c.client_user_id,
            client_name: c.client_name,
            title: c.title,
            case_type: c.case_type,
            case_status: c.case_status,
            court_date: c.court_date,
            is_deleted: c.is_deleted,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetResponse {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub size: i64,
    pub upload_date: DateTime<Utc>,
}

impl From<asset::Model> for AssetResponse {
    fn from(a: asset::Model) -> Self {
        Self {
            id: a.id,
            url: a.url,
            name: a.name,
            size: a.size,
            upload_date: a.upload_date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntryResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub asset_urls: Vec<String>,
}

impl From<timeline_entry::Model> for TimelineEntryResponse {
    fn from(t: timeline_entry::Model) -> Self {
        let asset_urls = t.urls();
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            date: t.date,
            asset_urls,
        }
    }
}

/// A case with its assets and audit timeline populated
#[derive(Debug, Clone, Serialize)]
pub struct CaseDetail {
    #[serde(flatten)]
    pub case: case_overview::Model,
    pub assets: Vec<AssetResponse>,
    pub timeline: Vec<TimelineEntryResponse>,
}
