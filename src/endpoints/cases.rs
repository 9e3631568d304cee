use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::endpoints::extractors::read_upload_form;
use crate::endpoints::session_layer;
use crate::error::Result;
use crate::middleware::{AnyRole, Authorized};
use crate::schemas::{
    AddAssets, CaseDetail, CaseListQuery, CasePatch, CaseRequest, CaseSummary, CreateCase,
    MessageResponse, Page, TimelineNote,
};
use crate::state::AppState;

/// Up to five documents per request
const CASE_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Create case routes. All of them need a session; admin-only operations are
/// enforced by the case service so every entry point shares one rule set.
pub fn cases_routes(state: AppState) -> Router {
    session_layer(
        Router::new()
            .route(
                "/",
                get(list_cases)
                    .post(create_case)
                    .layer(DefaultBodyLimit::max(CASE_BODY_LIMIT)),
            )
            .route(
                "/assets",
                post(add_assets).layer(DefaultBodyLimit::max(CASE_BODY_LIMIT)),
            )
            .route(
                "/{case_id}",
                get(get_case).patch(update_case).delete(delete_case),
            )
            .route("/{case_id}/timeline", post(add_timeline)),
        &state,
    )
    .with_state(state)
}

/// Create a case from a multipart form: `payload` JSON plus one file per asset entry
async fn create_case(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CaseDetail>)> {
    let form = read_upload_form(multipart).await?;
    let request: CreateCase = form.payload()?;
    let detail = state
        .cases
        .execute(&user, CaseRequest::Create(request), form.files)
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn list_cases(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Query(query): Query<CaseListQuery>,
) -> Result<Json<Page<CaseSummary>>> {
    Ok(Json(state.cases.list(&user, &query).await?))
}

async fn get_case(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Path(case_id): Path<i64>,
) -> Result<Json<CaseDetail>> {
    Ok(Json(state.cases.get(&user, case_id).await?))
}

async fn update_case(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Path(case_id): Path<i64>,
    Json(patch): Json<CasePatch>,
) -> Result<Json<CaseDetail>> {
    Ok(Json(
        state
            .cases
            .execute(&user, CaseRequest::Update { case_id, patch }, Vec::new())
            .await?,
    ))
}

async fn delete_case(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Path(case_id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    state.cases.delete(&user, case_id).await?;
    Ok(Json(MessageResponse::new("Case deleted")))
}

/// Attach documents to a case, named by id or by client name
async fn add_assets(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    multipart: Multipart,
) -> Result<Json<CaseDetail>> {
    let form = read_upload_form(multipart).await?;
    let request: AddAssets = form.payload()?;
    Ok(Json(
        state
            .cases
            .execute(&user, CaseRequest::AddAssets(request), form.files)
            .await?,
    ))
}

async fn add_timeline(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Path(case_id): Path<i64>,
    Json(note): Json<TimelineNote>,
) -> Result<(StatusCode, Json<CaseDetail>)> {
    let detail = state
        .cases
        .execute(&user, CaseRequest::AddTimeline { case_id, note }, Vec::new())
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}
