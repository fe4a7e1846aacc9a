//! Recommendation and decision endpoints, scoped per user.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use fournee_core::domain::user::{User, UserId};
use fournee_core::ports::UserDirectory;
use fournee_core::{
    ApplicationError, DecisionDraft, DecisionService, InterfaceError, ProductForecast,
    ProductionDecision, RecommendationEngine, StoredRecommendation,
};

#[derive(Clone)]
pub struct ApiState {
    pub users: Arc<dyn UserDirectory>,
    pub engine: Arc<RecommendationEngine>,
    pub decisions: Arc<DecisionService>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionBatchRequest {
    pub decisions: Vec<DecisionDraft>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub user_id: UserId,
    pub target_date: NaiveDate,
    pub correlation_id: String,
    pub recommendations: Vec<ProductForecast>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationList {
    pub target_date: NaiveDate,
    pub recommendations: Vec<StoredRecommendation>,
}

#[derive(Debug, Serialize)]
pub struct DecisionList {
    pub target_date: Option<NaiveDate>,
    pub decisions: Vec<ProductionDecision>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub error: String,
    pub detail: String,
    pub correlation_id: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/api/v1/users/{user_id}/recommendations",
            get(list_recommendations).post(generate_recommendations),
        )
        .route("/api/v1/users/{user_id}/decisions", get(list_decisions).post(record_decisions))
        .with_state(state)
}

pub async fn generate_recommendations(
    State(state): State<ApiState>,
    Path(user_id): Path<i64>,
    Query(query): Query<DateQuery>,
) -> ApiResult<GenerateResponse> {
    let correlation_id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let target_date = query.date.unwrap_or_else(tomorrow);

    let user = load_user(&state, UserId(user_id), &correlation_id).await?;
    let location = user
        .require_location()
        .map_err(|error| interface_error(ApplicationError::from(error), &correlation_id))?;

    let recommendations = state
        .engine
        .generate(user.id, target_date, location.latitude, location.longitude, now)
        .await
        .map_err(|error| interface_error(error, &correlation_id))?;

    info!(
        event_name = "api.recommendations.generated",
        correlation_id = %correlation_id,
        user_id,
        target_date = %target_date,
        products = recommendations.len(),
        "recommendations generated on request"
    );

    Ok(Json(GenerateResponse { user_id: user.id, target_date, correlation_id, recommendations }))
}

pub async fn list_recommendations(
    State(state): State<ApiState>,
    Path(user_id): Path<i64>,
    Query(query): Query<DateQuery>,
) -> ApiResult<RecommendationList> {
    let correlation_id = Uuid::new_v4().to_string();
    let target_date = query.date.unwrap_or_else(tomorrow);

    let recommendations = state
        .engine
        .list_recommendations(UserId(user_id), target_date)
        .await
        .map_err(|error| interface_error(error, &correlation_id))?;

    Ok(Json(RecommendationList { target_date, recommendations }))
}

pub async fn record_decisions(
    State(state): State<ApiState>,
    Path(user_id): Path<i64>,
    Json(body): Json<DecisionBatchRequest>,
) -> ApiResult<DecisionList> {
    let correlation_id = Uuid::new_v4().to_string();
    let user = load_user(&state, UserId(user_id), &correlation_id).await?;

    let decisions = state
        .decisions
        .record(user.id, body.decisions, Utc::now())
        .await
        .map_err(|error| interface_error(error, &correlation_id))?;

    let target_date = decisions.first().map(|decision| decision.target_date);
    Ok(Json(DecisionList { target_date, decisions }))
}

pub async fn list_decisions(
    State(state): State<ApiState>,
    Path(user_id): Path<i64>,
    Query(query): Query<DateQuery>,
) -> ApiResult<DecisionList> {
    let correlation_id = Uuid::new_v4().to_string();
    let target_date = query.date.unwrap_or_else(tomorrow);

    let decisions = state
        .decisions
        .list(UserId(user_id), target_date)
        .await
        .map_err(|error| interface_error(error, &correlation_id))?;

    Ok(Json(DecisionList { target_date: Some(target_date), decisions }))
}

fn tomorrow() -> NaiveDate {
    Utc::now().date_naive() + Duration::days(1)
}

async fn load_user(
    state: &ApiState,
    user_id: UserId,
    correlation_id: &str,
) -> Result<User, (StatusCode, Json<ApiError>)> {
    let user = state
        .users
        .find_user(user_id)
        .await
        .map_err(|error| interface_error(ApplicationError::from(error), correlation_id))?;

    user.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "The requested shop does not exist.".to_owned(),
                detail: format!("user {user_id} not found"),
                correlation_id: correlation_id.to_owned(),
            }),
        )
    })
}

fn interface_error(
    error: ApplicationError,
    correlation_id: &str,
) -> (StatusCode, Json<ApiError>) {
    let interface = error.into_interface(correlation_id);
    let (status, detail) = match &interface {
        InterfaceError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, message.clone()),
        InterfaceError::ServiceUnavailable { message, .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, message.clone())
        }
        InterfaceError::Internal { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
        }
    };

    warn!(
        event_name = "api.request.failed",
        correlation_id = %interface.correlation_id(),
        status = status.as_u16(),
        error = %interface,
        "request failed"
    );

    (
        status,
        Json(ApiError {
            error: interface.user_message().to_owned(),
            detail,
            correlation_id: interface.correlation_id().to_owned(),
        }),
    )
}
