//! HTTP routes.

use std::time::Instant;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use habitual_core::{Goal, GoalId, GoalStatus, Time};
use habitual_progress::{GoalProgress, TodayTask};
use habitual_work::{AiGoalSpec, GoalError, ManualGoalSpec};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/generate-plan", post(generate_plan))
        .route("/today-tasks/{user_id}", get(today_tasks))
        .route("/complete-task/{goal_id}/{day}", post(complete_task))
        .route("/manual-goal", post(manual_goal))
        .route("/goal/{goal_id}", get(get_goal))
        .route("/goals/{user_id}", get(list_goals))
        .route("/abandon-goal/{goal_id}", post(abandon_goal))
        .route("/progress/{user_id}", get(progress));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(middleware::from_fn(log_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Handled request"
    );
    response
}

// ── Request / response types ─────────────────────────────────────────────

/// Plan length as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Timeframe {
    Number(serde_json::Number),
    Text(String),
}

impl Timeframe {
    fn days(&self) -> Option<i64> {
        match self {
            Timeframe::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Timeframe::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GeneratePlanRequest {
    user_id: String,
    current_condition: String,
    goal: String,
    timeframe: Option<Timeframe>,
    category: String,
    difficulty: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ManualGoalRequest {
    user_id: String,
    title: String,
    description: String,
    date: String,
    category: String,
    difficulty: String,
}

#[derive(Debug, Deserialize)]
struct CompleteTaskRequest {
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct GoalsQuery {
    status: Option<String>,
}

#[derive(Serialize)]
struct GoalResponse {
    goal: Goal,
}

#[derive(Serialize)]
struct GoalsResponse {
    goals: Vec<Goal>,
}

#[derive(Serialize)]
struct TasksResponse {
    tasks: Vec<TodayTask>,
}

#[derive(Serialize)]
struct ProgressResponse {
    timestamp: Time,
    progress: Vec<GoalProgress>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn generate_plan(
    State(state): State<AppState>,
    body: Result<Json<GeneratePlanRequest>, JsonRejection>,
) -> ApiResult<GoalResponse> {
    let Json(req) = body?;
    let timeframe_days = req
        .timeframe
        .as_ref()
        .and_then(Timeframe::days)
        .ok_or_else(|| {
            GoalError::Validation("timeframe must be a positive number of days".to_string())
        })?;

    let spec = AiGoalSpec {
        user_id: req.user_id,
        current_condition: req.current_condition,
        desired_achievement: req.goal,
        timeframe_days,
        category: req.category,
        difficulty: req.difficulty,
    };
    let goal = state.goals.create_ai_goal(spec, Utc::now()).await?;
    Ok(Json(GoalResponse { goal }))
}

async fn manual_goal(
    State(state): State<AppState>,
    body: Result<Json<ManualGoalRequest>, JsonRejection>,
) -> ApiResult<GoalResponse> {
    let Json(req) = body?;
    let spec = ManualGoalSpec {
        user_id: req.user_id,
        title: req.title,
        description: req.description,
        date: req.date,
        category: req.category,
        difficulty: req.difficulty,
    };
    let goal = state.goals.create_manual_goal(spec, Utc::now()).await?;
    Ok(Json(GoalResponse { goal }))
}

async fn today_tasks(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
) -> ApiResult<TasksResponse> {
    let Path(user_id) = user_id?;
    let tasks = state.resolver.today_tasks(&user_id, Utc::now()).await?;
    Ok(Json(TasksResponse { tasks }))
}

async fn complete_task(
    State(state): State<AppState>,
    params: Result<Path<(String, String)>, PathRejection>,
    body: Result<Json<CompleteTaskRequest>, JsonRejection>,
) -> ApiResult<GoalResponse> {
    let Path((goal_id, day)) = params?;
    let goal_id = parse_goal_id(&goal_id)?;
    let day: u32 = day
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid day: {day:?}")))?;
    let Json(req) = body?;

    let goal = state
        .completion
        .set_completion(goal_id, day, req.completed, Utc::now())
        .await?;
    Ok(Json(GoalResponse { goal }))
}

async fn list_goals(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
    query: Result<Query<GoalsQuery>, QueryRejection>,
) -> ApiResult<GoalsResponse> {
    let Path(user_id) = user_id?;
    let Query(query) = query?;
    let status = query
        .status
        .as_deref()
        .map(str::parse::<GoalStatus>)
        .transpose()
        .map_err(|e| GoalError::Validation(e.to_string()))?;

    let goals = state.goals.list_goals(&user_id, status).await?;
    Ok(Json(GoalsResponse { goals }))
}

async fn get_goal(
    State(state): State<AppState>,
    goal_id: Result<Path<String>, PathRejection>,
) -> ApiResult<GoalResponse> {
    let Path(goal_id) = goal_id?;
    let goal_id = parse_goal_id(&goal_id)?;
    let goal = state.goals.get_goal(goal_id).await?;
    Ok(Json(GoalResponse { goal }))
}

async fn abandon_goal(
    State(state): State<AppState>,
    goal_id: Result<Path<String>, PathRejection>,
) -> ApiResult<GoalResponse> {
    let Path(goal_id) = goal_id?;
    let goal_id = parse_goal_id(&goal_id)?;
    let goal = state.goals.abandon_goal(goal_id, Utc::now()).await?;
    Ok(Json(GoalResponse { goal }))
}

async fn progress(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
) -> ApiResult<ProgressResponse> {
    let Path(user_id) = user_id?;
    let snapshot = state.progress.snapshot(&user_id, Utc::now()).await?;
    Ok(Json(ProgressResponse {
        timestamp: snapshot.timestamp,
        progress: snapshot.goals,
    }))
}

/// An id that does not parse cannot name a stored goal.
fn parse_goal_id(raw: &str) -> Result<GoalId, ApiError> {
    raw.parse()
        .map_err(|_| GoalError::NotFound(format!("goal {raw}")).into())
}
