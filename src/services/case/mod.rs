//! Case orchestrator: cases, their asset lists and audit timelines

pub mod numbering;
mod saga;

pub use saga::Saga;

use chrono::{DateTime, Datelike, Utc};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::case_overview::{self, CaseStatus};
use crate::models::notification::NotificationKind;
use crate::models::user::Role;
use crate::models::prelude::*;
use crate::models::{asset, asset_list, profile, profile_case, timeline_entry, timeline_list, user};
use crate::schemas::{
    AddAssets, AssetMeta, AssetResponse, CaseDetail, CaseListQuery, CasePatch, CaseRequest,
    CaseSummary, CaseTarget, CreateCase, Page, TimelineEntryResponse, TimelineNote,
    MAX_FILES_PER_REQUEST,
};
use crate::services::notification::NotificationService;
use crate::services::storage::{ObjectStorage, UploadFile};

use numbering::next_case_number;

pub const CASE_STARTED: &str = "Case Started";
pub const ASSETS_UPDATED: &str = "Assets Updated";
pub const CASE_UPDATED: &str = "Case Updated";

#[derive(Clone)]
pub struct CaseService {
    db: DatabaseConnection,
    storage: Arc<dyn ObjectStorage>,
    notifications: NotificationService,
}

/// Load the live profile of a client account
async fn active_client_profile<C: ConnectionTrait>(
    conn: &C,
    client_user_id: i64,
) -> Result<profile::Model> {
    let client = User::find_by_id(client_user_id)
        .filter(user::Column::IsDeleted.eq(false))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;
    if client.role != Role::Client {
        return Err(AppError::BadRequest(
            "Cases can only be assigned to client accounts".to_string(),
        ));
    }
    if client.is_blocked {
        return Err(AppError::BadRequest("Client account is blocked".to_string()));
    }

    Profile::find()
        .filter(profile::Column::UserId.eq(client_user_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Client profile not found".to_string()))
}

async fn live_case<C: ConnectionTrait>(conn: &C, case_id: i64) -> Result<case_overview::Model> {
    CaseOverview::find_by_id(case_id)
        .filter(case_overview::Column::IsDeleted.eq(false))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Case not found".to_string()))
}

/// Re-read a live case inside a transaction, holding its row lock on Postgres
async fn lock_live_case<C: ConnectionTrait>(conn: &C, case_id: i64) -> Result<case_overview::Model> {
    let mut query = CaseOverview::find_by_id(case_id).filter(case_overview::Column::IsDeleted.eq(false));
    // SQLite serializes writers on the database lock instead
    if conn.get_database_backend() == DbBackend::Postgres {
        query = query.lock_exclusive();
    }
    query
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Case not found".to_string()))
}

/// Timeline list for the case, created on first use
async fn ensure_timeline_list<C: ConnectionTrait>(
    conn: &C,
    case: &case_overview::Model,
) -> Result<i64> {
    if let Some(id) = case.timeline_list_id {
        return Ok(id);
    }

    // case_id is unique, so a racing creator leaves exactly one row behind
    TimelineList::insert(timeline_list::ActiveModel {
        case_id: Set(case.id),
        is_deleted: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::column(timeline_list::Column::CaseId)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    let list = TimelineList::find()
        .filter(timeline_list::Column::CaseId.eq(case.id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Timeline list missing for case {}", case.id)))?;

    CaseOverview::update_many()
        .col_expr(case_overview::Column::TimelineListId, Expr::value(list.id))
        .filter(case_overview::Column::Id.eq(case.id))
        .exec(conn)
        .await?;

    Ok(list.id)
}

/// Asset list for the case, created on first use
async fn ensure_asset_list<C: ConnectionTrait>(
    conn: &C,
    case: &case_overview::Model,
) -> Result<i64> {
    if let Some(id) = case.asset_list_id {
        return Ok(id);
    }

    AssetList::insert(asset_list::ActiveModel {
        case_id: Set(case.id),
        is_deleted: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::column(asset_list::Column::CaseId)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    let list = AssetList::find()
        .filter(asset_list::Column::CaseId.eq(case.id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Asset list missing for case {}", case.id)))?;

    CaseOverview::update_many()
        .col_expr(case_overview::Column::AssetListId, Expr::value(list.id))
        .filter(case_overview::Column::Id.eq(case.id))
        .exec(conn)
        .await?;

    Ok(list.id)
}

async fn append_timeline<C: ConnectionTrait>(
    conn: &C,
    case: &case_overview::Model,
    title: &str,
    description: &str,
    date: DateTime<Utc>,
    asset_urls: &[String],
) -> Result<timeline_entry::Model> {
    let list_id = ensure_timeline_list(conn, case).await?;

    let entry = timeline_entry::ActiveModel {
        timeline_list_id: Set(list_id),
        title: Set(title.to_string()),
        description: Set(description.to_string()),
        date: Set(date),
        asset_urls: Set(serde_json::json!(asset_urls)),
        is_deleted: Set(false),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(entry)
}

/// Case with assets and live timeline entries, in insertion order
async fn load_detail<C: ConnectionTrait>(conn: &C, case_id: i64) -> Result<CaseDetail> {
    let case = CaseOverview::find_by_id(case_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Case not found".to_string()))?;

    let assets = match case.asset_list_id {
        Some(list_id) => Asset::find()
            .filter(asset::Column::AssetListId.eq(list_id))
            .order_by_asc(asset::Column::Id)
            .all(conn)
            .await?,
        None => Vec::new(),
    };

    let timeline = match case.timeline_list_id {
        Some(list_id) => TimelineEntry::find()
            .filter(timeline_entry::Column::TimelineListId.eq(list_id))
            .filter(timeline_entry::Column::IsDeleted.eq(false))
            .order_by_asc(timeline_entry::Column::Id)
            .all(conn)
            .await?,
        None => Vec::new(),
    };

    Ok(CaseDetail {
        case,
        assets: assets.into_iter().map(AssetResponse::from).collect(),
        timeline: timeline
            .into_iter()
            .map(TimelineEntryResponse::from)
            .collect(),
    })
}

fn assets_added_text(count: usize) -> String {
    format!("{} asset(s) added to the case.", count)
}

/// Field-by-field diff of a patch against the stored case
fn describe_changes(case: &case_overview::Model, patch: &CasePatch) -> Vec<(&'static str, String)> {
    let mut changes = Vec::new();

    if let Some(title) = &patch.title {
        if case.title.as_deref() != Some(title.as_str()) {
            changes.push(("title", title.clone()));
        }
    }
    if let Some(name) = &patch.client_name {
        if &case.client_name != name {
            changes.push(("client_name", name.clone()));
        }
    }
    if let Some(case_type) = patch.case_type {
        if case.case_type != case_type {
            changes.push(("case_type", case_type.to_string()));
        }
    }
    if let Some(status) = patch.case_status {
        if case.case_status != status {
            changes.push(("case_status", status.to_string()));
        }
    }
    if let Some(date) = patch.court_date {
        if case.court_date != Some(date) {
            changes.push(("court_date", date.to_string()));
        }
    }
    if let Some(note) = &patch.note {
        if case.note.as_deref() != Some(note.as_str()) {
            changes.push(("note", note.clone()));
        }
    }
    if let Some(client_id) = patch.client_user_id {
        if case.client_user_id != client_id {
            changes.push(("client_user_id", client_id.to_string()));
        }
    }

    changes
}

fn changed(changes: &[(&'static str, String)], field: &str) -> bool {
    changes.iter().any(|(name, _)| *name == field)
}

impl CaseService {
    pub fn new(
        db: DatabaseConnection,
        storage: Arc<dyn ObjectStorage>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            db,
            storage,
            notifications,
        }
    }

    /// Validate and run one case mutation on behalf of `actor`
    pub async fn execute(
        &self,
        actor: &user::Model,
        request: CaseRequest,
        files: Vec<UploadFile>,
    ) -> Result<CaseDetail> {
        request.validate()?;

        if files.len() > MAX_FILES_PER_REQUEST {
            return Err(AppError::BadRequest(format!(
                "At most {} files can be uploaded at once",
                MAX_FILES_PER_REQUEST
            )));
        }
        let expected = request.asset_meta().len();
        if files.len() != expected {
            return Err(AppError::BadRequest(format!(
                "Received {} file(s) for {} asset entr{}",
                files.len(),
                expected,
                if expected == 1 { "y" } else { "ies" }
            )));
        }

        if !actor.is_admin() && !matches!(request, CaseRequest::AddAssets(_)) {
            return Err(AppError::Forbidden(
                "Only admins can modify case details".to_string(),
            ));
        }

        tracing::debug!(actor_id = actor.id, operation = request.name(), files = files.len(), "Executing case request");

        match request {
            CaseRequest::Create(req) => self.create(actor, req, files).await,
            CaseRequest::Update { case_id, patch } => self.update(actor, case_id, patch).await,
            CaseRequest::AddAssets(req) => self.add_assets(actor, req, files).await,
            CaseRequest::AddTimeline { case_id, note } => {
                self.add_timeline(actor, case_id, note).await
            }
        }
    }

    async fn create(
        &self,
        actor: &user::Model,
        req: CreateCase,
        files: Vec<UploadFile>,
    ) -> Result<CaseDetail> {
        let client_profile = active_client_profile(&self.db, req.client_user_id).await?;

        let mut saga = Saga::begin(&self.db, self.storage.as_ref(), "create_case").await?;
        let outcome = self
            .create_steps(&mut saga, actor, &req, &client_profile, &files)
            .await;
        let detail = saga.finish(outcome).await?;

        tracing::info!(
            case_id = detail.case.id,
            case_number = %detail.case.case_number,
            admin_id = actor.id,
            client_user_id = req.client_user_id,
            "Case created"
        );

        self.notify_client(
            detail.case.client_user_id,
            &format!("Your case {} has been opened.", detail.case.case_number),
        )
        .await;

        Ok(detail)
    }

    async fn create_steps(
        &self,
        saga: &mut Saga<'_>,
        actor: &user::Model,
        req: &CreateCase,
        client_profile: &profile::Model,
        files: &[UploadFile],
    ) -> Result<CaseDetail> {
        let now = Utc::now();
        let case_number = next_case_number(saga.txn(), now.year()).await?;

        let case = case_overview::ActiveModel {
            case_number: Set(case_number),
            user_id: Set(actor.id),
            client_user_id: Set(req.client_user_id),
            client_name: Set(req.client_name.trim().to_string()),
            title: Set(req.title.clone()),
            case_type: Set(req.case_type),
            case_status: Set(req.case_status),
            court_date: Set(req.court_date),
            note: Set(req.note.clone()),
            asset_list_id: Set(None),
            timeline_list_id: Set(None),
            is_mail_sent: Set(false),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(saga.txn())
        .await?;

        append_timeline(
            saga.txn(),
            &case,
            CASE_STARTED,
            &format!("Case for {} began today.", case.client_name),
            now,
            &[],
        )
        .await?;

        if !files.is_empty() {
            // Lists are created lazily, so re-read the row to pick up the timeline link
            let case = live_case(saga.txn(), case.id).await?;
            self.attach_assets(saga, &case, &req.assets, files).await?;
        }

        profile_case::ActiveModel {
            profile_id: Set(client_profile.id),
            case_id: Set(case.id),
            ..Default::default()
        }
        .insert(saga.txn())
        .await?;

        load_detail(saga.txn(), case.id).await
    }

    /// Upload files, append them to the asset list and record one timeline entry
    async fn attach_assets(
        &self,
        saga: &mut Saga<'_>,
        case: &case_overview::Model,
        metas: &[AssetMeta],
        files: &[UploadFile],
    ) -> Result<()> {
        let now = Utc::now();
        let mut urls = Vec::with_capacity(files.len());
        let mut stored_assets = Vec::with_capacity(files.len());

        for (meta, file) in metas.iter().zip(files) {
            let stored = saga.upload(file).await?;
            urls.push(stored.url.clone());
            stored_assets.push((meta, stored));
        }

        let list_id = ensure_asset_list(saga.txn(), case).await?;
        for (meta, stored) in stored_assets {
            asset::ActiveModel {
                asset_list_id: Set(list_id),
                url: Set(stored.url),
                name: Set(meta.name.clone()),
                size: Set(stored.size),
                upload_date: Set(meta.upload_date.unwrap_or(now)),
                ..Default::default()
            }
            .insert(saga.txn())
            .await?;
        }

        append_timeline(
            saga.txn(),
            case,
            ASSETS_UPDATED,
            &assets_added_text(urls.len()),
            now,
            &urls,
        )
        .await?;

        Ok(())
    }

    async fn update(&self, actor: &user::Model, case_id: i64, patch: CasePatch) -> Result<CaseDetail> {
        let case = live_case(&self.db, case_id).await?;
        let changes = describe_changes(&case, &patch);
        if changes.is_empty() {
            return load_detail(&self.db, case_id).await;
        }

        let new_profile = match patch.client_user_id {
            Some(client_id) if client_id != case.client_user_id => {
                Some(active_client_profile(&self.db, client_id).await?)
            }
            _ => None,
        };

        let mut saga = Saga::begin(&self.db, self.storage.as_ref(), "update_case").await?;
        let outcome = self
            .update_steps(&saga, &case, &patch, &changes, new_profile.as_ref())
            .await;
        let detail = saga.finish(outcome).await?;

        tracing::info!(case_id, admin_id = actor.id, changes = changes.len(), "Case updated");

        if changed(&changes, "case_status") {
            self.notify_client(
                detail.case.client_user_id,
                &format!(
                    "Case {} status changed to {}.",
                    detail.case.case_number, detail.case.case_status
                ),
            )
            .await;
        }

        Ok(detail)
    }

    async fn update_steps(
        &self,
        saga: &Saga<'_>,
        case: &case_overview::Model,
        patch: &CasePatch,
        changes: &[(&'static str, String)],
        new_profile: Option<&profile::Model>,
    ) -> Result<CaseDetail> {
        let now = Utc::now();
        let mut active: case_overview::ActiveModel =
            lock_live_case(saga.txn(), case.id).await?.into();

        if let Some(title) = &patch.title {
            active.title = Set(Some(title.clone()));
        }
        if let Some(name) = &patch.client_name {
            active.client_name = Set(name.trim().to_string());
        }
        if let Some(case_type) = patch.case_type {
            active.case_type = Set(case_type);
        }
        if let Some(status) = patch.case_status {
            active.case_status = Set(status);
        }
        if changed(changes, "court_date") {
            active.court_date = Set(patch.court_date);
            // A new court date earns its own reminder
            active.is_mail_sent = Set(false);
        }
        if let Some(note) = &patch.note {
            active.note = Set(Some(note.clone()));
        }
        if let Some(profile) = new_profile {
            active.client_user_id = Set(profile.user_id);
        }
        active.updated_at = Set(now);
        let updated = active.update(saga.txn()).await?;

        let summary = changes
            .iter()
            .map(|(field, value)| format!("{}: {}", field, value))
            .collect::<Vec<_>>()
            .join(", ");
        append_timeline(
            saga.txn(),
            &updated,
            CASE_UPDATED,
            &format!("Case details updated. Changes: {}", summary),
            now,
            &[],
        )
        .await?;

        if let Some(profile) = new_profile {
            ProfileCase::delete_many()
                .filter(profile_case::Column::CaseId.eq(case.id))
                .exec(saga.txn())
                .await?;
            profile_case::ActiveModel {
                profile_id: Set(profile.id),
                case_id: Set(case.id),
                ..Default::default()
            }
            .insert(saga.txn())
            .await?;
        }

        load_detail(saga.txn(), case.id).await
    }

    /// Find the single case an asset upload refers to, scoped to the actor
    async fn resolve_target(&self, actor: &user::Model, target: &CaseTarget) -> Result<case_overview::Model> {
        match target {
            CaseTarget::CaseId(id) => {
                let case = live_case(&self.db, *id).await?;
                if !actor.is_admin() && case.client_user_id != actor.id {
                    return Err(AppError::Forbidden(
                        "You can only add assets to your own cases".to_string(),
                    ));
                }
                Ok(case)
            }
            CaseTarget::ClientName(name) => {
                let mut query = CaseOverview::find()
                    .filter(case_overview::Column::ClientName.eq(name.trim()))
                    .filter(case_overview::Column::IsDeleted.eq(false));
                query = if actor.is_admin() {
                    query.filter(case_overview::Column::UserId.eq(actor.id))
                } else {
                    query.filter(case_overview::Column::ClientUserId.eq(actor.id))
                };

                // Two rows are enough to tell a unique match from an ambiguous one
                let mut matches = query
                    .order_by_asc(case_overview::Column::Id)
                    .limit(2)
                    .all(&self.db)
                    .await?;
                match matches.len() {
                    0 => Err(AppError::NotFound(format!("No case found for client '{}'", name.trim()))),
                    1 => Ok(matches.remove(0)),
                    _ => Err(AppError::Conflict(format!(
                        "More than one case matches client '{}', use the case id",
                        name.trim()
                    ))),
                }
            }
        }
    }

    async fn add_assets(
        &self,
        actor: &user::Model,
        req: AddAssets,
        files: Vec<UploadFile>,
    ) -> Result<CaseDetail> {
        let target = self.resolve_target(actor, &req.target).await?;

        let mut saga = Saga::begin(&self.db, self.storage.as_ref(), "add_assets").await?;
        let outcome = async {
            let case = lock_live_case(saga.txn(), target.id).await?;
            self.attach_assets(&mut saga, &case, &req.assets, &files).await?;
            load_detail(saga.txn(), case.id).await
        }
        .await;
        let detail = saga.finish(outcome).await?;

        tracing::info!(case_id = target.id, actor_id = actor.id, count = files.len(), "Assets added");
        Ok(detail)
    }

    async fn add_timeline(&self, actor: &user::Model, case_id: i64, note: TimelineNote) -> Result<CaseDetail> {
        live_case(&self.db, case_id).await?;

        let saga = Saga::begin(&self.db, self.storage.as_ref(), "add_timeline").await?;
        let outcome = async {
            let case = lock_live_case(saga.txn(), case_id).await?;
            append_timeline(
                saga.txn(),
                &case,
                note.title.trim(),
                note.description.trim(),
                note.date.unwrap_or_else(Utc::now),
                &note.asset_urls,
            )
            .await?;
            load_detail(saga.txn(), case.id).await
        }
        .await;
        let detail = saga.finish(outcome).await?;

        tracing::info!(case_id, admin_id = actor.id, "Timeline note added");
        Ok(detail)
    }

    /// Soft-delete the case and its lists and unlink it from the client profile
    pub async fn delete(&self, actor: &user::Model, case_id: i64) -> Result<()> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden("Only admins can delete cases".to_string()));
        }
        live_case(&self.db, case_id).await?;

        let saga = Saga::begin(&self.db, self.storage.as_ref(), "delete_case").await?;
        let outcome = async {
            let txn = saga.txn();
            let case = lock_live_case(txn, case_id).await?;
            let now = Utc::now();

            CaseOverview::update_many()
                .col_expr(case_overview::Column::IsDeleted, Expr::value(true))
                .col_expr(case_overview::Column::UpdatedAt, Expr::value(now))
                .filter(case_overview::Column::Id.eq(case.id))
                .exec(txn)
                .await?;

            if let Some(list_id) = case.asset_list_id {
                AssetList::update_many()
                    .col_expr(asset_list::Column::IsDeleted, Expr::value(true))
                    .filter(asset_list::Column::Id.eq(list_id))
                    .exec(txn)
                    .await?;
            }
            if let Some(list_id) = case.timeline_list_id {
                TimelineList::update_many()
                    .col_expr(timeline_list::Column::IsDeleted, Expr::value(true))
                    .filter(timeline_list::Column::Id.eq(list_id))
                    .exec(txn)
                    .await?;
            }

            ProfileCase::delete_many()
                .filter(profile_case::Column::CaseId.eq(case.id))
                .exec(txn)
                .await?;

            Ok(())
        }
        .await;
        saga.finish(outcome).await?;

        tracing::info!(case_id, admin_id = actor.id, "Case deleted");
        Ok(())
    }

    /// Paginated listing, newest first. Clients only see their own cases.
    pub async fn list(&self, actor: &user::Model, query: &CaseListQuery) -> Result<Page<CaseSummary>> {
        let paging = query.paging();
        let (page, limit) = (paging.page(), paging.limit());

        let mut select = CaseOverview::find().filter(case_overview::Column::IsDeleted.eq(false));

        if let Some(status) = query.status.as_deref() {
            let status = CaseStatus::parse(status)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown case status '{}'", status)))?;
            select = select.filter(case_overview::Column::CaseStatus.eq(status));
        }

        if actor.is_admin() {
            if let Some(owner) = query.owner {
                select = select.filter(case_overview::Column::UserId.eq(owner));
            }
        } else {
            select = select.filter(case_overview::Column::ClientUserId.eq(actor.id));
        }

        let paginator = select
            .order_by_desc(case_overview::Column::CreatedAt)
            .order_by_desc(case_overview::Column::Id)
            .paginate(&self.db, limit);

        let total = paginator.num_items().await?;
        let cases = paginator.fetch_page(page - 1).await?;

        Ok(Page::new(
            cases.into_iter().map(CaseSummary::from).collect(),
            page,
            limit,
            total,
        ))
    }

    /// Single case with assets and timeline; admins can see soft-deleted cases
    pub async fn get(&self, actor: &user::Model, case_id: i64) -> Result<CaseDetail> {
        let detail = load_detail(&self.db, case_id).await?;

        if !actor.is_admin()
            && (detail.case.client_user_id != actor.id || detail.case.is_deleted)
        {
            return Err(AppError::NotFound("Case not found".to_string()));
        }
        Ok(detail)
    }

    async fn notify_client(&self, client_user_id: i64, detail: &str) {
        if let Err(e) = self
            .notifications
            .notify_user(client_user_id, NotificationKind::CaseNotification, detail)
            .await
        {
            tracing::warn!(user_id = client_user_id, error = %e, "Case notification failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::case_overview::CaseType;
    use chrono::NaiveDate;

    fn sample_case() -> case_overview::Model {
        let now = Utc::now();
        case_overview::Model {
            id: 1,
            case_number: "CASE-2026-001".to_string(),
            user_id: 1,
            client_user_id: 2,
            client_name: "Ana Ruiz".to_string(),
            title: None,
            case_type: CaseType::TrafficViolation,
            case_status: CaseStatus::Pending,
            court_date: None,
            note: None,
            asset_list_id: None,
            timeline_list_id: None,
            is_mail_sent: false,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_describe_changes_skips_unchanged_fields() {
        let case = sample_case();
        let patch = CasePatch {
            client_name: Some("Ana Ruiz".to_string()),
            case_status: Some(CaseStatus::InProgress),
            court_date: NaiveDate::from_ymd_opt(2026, 11, 2),
            ..Default::default()
        };

        let changes = describe_changes(&case, &patch);
        assert_eq!(
            changes,
            vec![
                ("case_status", "In_Progress".to_string()),
                ("court_date", "2026-11-02".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_patch_has_no_changes() {
        assert!(describe_changes(&sample_case(), &CasePatch::default()).is_empty());
    }

    #[test]
    fn test_assets_added_text() {
        assert_eq!(assets_added_text(2), "2 asset(s) added to the case.");
    }
}
