//! JSON REST handlers for automation rules.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use courier_app::ports::{
    EventPublisher, Geocoder, RouteStore, RuleRepository, TravelTimeProvider,
};
use courier_domain::id::RuleId;
use courier_domain::rule::{AutomationRule, Condition, RuleAction};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a rule.
#[derive(Deserialize)]
pub struct CreateRuleRequest {
    pub name: String,
    pub enabled: Option<bool>,
    pub condition: Condition,
    pub action: RuleAction,
}

/// Request body for updating a rule.
#[derive(Deserialize)]
pub struct UpdateRuleRequest {
    pub name: String,
    pub enabled: bool,
    pub condition: Condition,
    pub action: RuleAction,
}

/// Request body for toggling a rule.
#[derive(Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<AutomationRule>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from endpoints returning a single rule.
pub enum RuleResponse {
    Ok(Json<AutomationRule>),
}

impl IntoResponse for RuleResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<AutomationRule>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn parse_id(id: &str) -> Result<RuleId, ApiError> {
    RuleId::from_str(id).map_err(|_| ApiError::unknown_resource("Rule", id))
}

/// `GET /api/rules`: list all rules.
pub async fn list<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
) -> Result<ListResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    let rules = state.rule_service.list_rules().await?;
    Ok(ListResponse::Ok(Json(rules)))
}

/// `GET /api/rules/{id}`: get a rule by id.
pub async fn get<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
    Path(id): Path<String>,
) -> Result<RuleResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let rule = state.rule_service.get_rule(id).await?;
    Ok(RuleResponse::Ok(Json(rule)))
}

/// `POST /api/rules`: create a new rule.
pub async fn create<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<CreateResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    let mut builder = AutomationRule::builder()
        .name(req.name)
        .condition(req.condition)
        .action(req.action);
    if let Some(enabled) = req.enabled {
        builder = builder.enabled(enabled);
    }
    let rule = builder.build()?;

    let created = state.rule_service.create_rule(rule).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/rules/{id}`: update an existing rule.
pub async fn update<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRuleRequest>,
) -> Result<RuleResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    let id = parse_id(&id)?;

    // Keep the firing history across edits.
    let existing = state.rule_service.get_rule(id).await?;

    let mut builder = AutomationRule::builder()
        .id(id)
        .name(req.name)
        .enabled(req.enabled)
        .condition(req.condition)
        .action(req.action);
    if let Some(last_fired) = existing.last_fired {
        builder = builder.last_fired(last_fired);
    }
    let rule = builder.build()?;

    let updated = state.rule_service.update_rule(rule).await?;
    Ok(RuleResponse::Ok(Json(updated)))
}

/// `PUT /api/rules/{id}/enabled`: enable or disable a rule.
pub async fn set_enabled<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
    Path(id): Path<String>,
    Json(req): Json<SetEnabledRequest>,
) -> Result<RuleResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let rule = state.rule_service.set_enabled(id, req.enabled).await?;
    Ok(RuleResponse::Ok(Json(rule)))
}

/// `DELETE /api/rules/{id}`: delete a rule.
pub async fn delete<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    state.rule_service.delete_rule(id).await?;
    Ok(DeleteResponse::NoContent)
}
