//! HTTP handlers, one per API route.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use pawtale_core::{Action, SessionId, Species};
use pawtale_engine::NarrationStatus;

use crate::error::ApiError;
use crate::server::AppState;
use crate::view::{SessionView, SpeciesView, TurnView};

const INDEX_HTML: &str = include_str!("../static/index.html");

type ApiResult<T> = Result<T, ApiError>;

fn session_id(raw: &str) -> ApiResult<SessionId> {
    SessionId::parse(raw).map_err(|e| ApiError::from(pawtale_engine::GameError::from(e)))
}

#[derive(Debug, Deserialize)]
pub struct SetupRequest {
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub young_reader: bool,
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceRequest {
    pub index: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReadingLevelRequest {
    pub young_reader: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct NarrationStartQuery {
    pub voice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NarrationStatusQuery {
    #[serde(default)]
    pub wait: bool,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn list_species(State(state): State<AppState>) -> Json<Vec<SpeciesView>> {
    let species = Species::ALL
        .iter()
        .map(|&s| SpeciesView::new(s, state.game.suggest_name(s)))
        .collect();
    Json(species)
}

pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let id = state.game.new_session();
    tracing::debug!(session_id = %id, "session minted");
    (StatusCode::CREATED, Json(json!({ "session_id": id })))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> ApiResult<Json<SessionView>> {
    let id = session_id(&raw)?;
    let snap = state
        .game
        .view(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("no pet for session {id}")))?;
    Ok(Json(SessionView::new(&id, &snap)))
}

pub async fn setup(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Json(req): Json<SetupRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = session_id(&raw)?;
    let outcome = state
        .game
        .setup(&id, &req.name, &req.species, req.young_reader)
        .await?;
    Ok((StatusCode::CREATED, Json(TurnView::new(&id, outcome))))
}

pub async fn act(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Json(req): Json<ActionRequest>,
) -> ApiResult<Json<TurnView>> {
    let id = session_id(&raw)?;
    let action: Action = req.action.parse().map_err(ApiError::invalid_params)?;
    let outcome = state.game.act(&id, action).await?;
    Ok(Json(TurnView::new(&id, outcome)))
}

pub async fn choose(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Json(req): Json<ChoiceRequest>,
) -> ApiResult<Json<TurnView>> {
    let id = session_id(&raw)?;
    // Negative indices fall out of range and resolve to a no-op.
    let index = usize::try_from(req.index).unwrap_or(usize::MAX);
    let outcome = state.game.choose(&id, index).await?;
    Ok(Json(TurnView::new(&id, outcome)))
}

pub async fn set_reading_level(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Json(req): Json<ReadingLevelRequest>,
) -> ApiResult<Json<TurnView>> {
    let id = session_id(&raw)?;
    let outcome = state.game.set_reading_level(&id, req.young_reader).await?;
    Ok(Json(TurnView::new(&id, outcome)))
}

pub async fn reset(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> ApiResult<StatusCode> {
    let id = session_id(&raw)?;
    state.game.reset(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn start_narration(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Query(query): Query<NarrationStartQuery>,
) -> ApiResult<(StatusCode, Json<NarrationStatus>)> {
    let id = session_id(&raw)?;
    let status = state.game.start_narration(&id, query.voice).await?;
    Ok((StatusCode::ACCEPTED, Json(status)))
}

pub async fn narration_status(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Query(query): Query<NarrationStatusQuery>,
) -> ApiResult<Json<NarrationStatus>> {
    let id = session_id(&raw)?;
    state
        .game
        .narration_status(&id, query.wait)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("narration has not been started for this event"))
}
