// SPDX-License-Identifier: MIT

//! Development HTTP server
//!
//! | Route                                | Action                      |
//! |--------------------------------------|-----------------------------|
//! | `GET  /api/health`                   | liveness                    |
//! | `GET  /api/tools`                    | tool ids and schemas        |
//! | `POST /api/tools/{id}`               | invoke one tool             |
//! | `GET  /api/agents`                   | agent descriptors           |
//! | `POST /api/agents/{name}/generate`   | run an agent on a prompt    |
//! | `GET  /api/workflows/promotion`      | trigger and step schemas    |
//! | `POST /api/workflows/promotion`      | run the promotion workflow  |

use crate::adk::error::{CampaignError, ModelError, ToolError, WorkflowError};
use crate::adk::tool::describe;
use crate::campaign::app::Campaign;
use crate::campaign::workflow::PromotionState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

type AppState = Arc<Campaign>;

pub fn router(campaign: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/tools", get(list_tools))
        .route("/api/tools/{id}", post(call_tool))
        .route("/api/agents", get(list_agents))
        .route("/api/agents/{name}/generate", post(generate))
        .route(
            "/api/workflows/promotion",
            get(describe_promotion_workflow).post(run_promotion_workflow),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(campaign)
}

pub async fn serve(campaign: AppState, addr: SocketAddr) -> Result<(), CampaignError> {
    // Request spans go through tracing; library logs stay on env_logger.
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .try_init();

    let app = router(campaign);
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Error response: `{ "error": message }` under a status per failure class
pub struct ApiError(CampaignError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        status_for(&self.0)
    }
}

impl From<CampaignError> for ApiError {
    fn from(e: CampaignError) -> Self {
        Self(e)
    }
}

impl From<WorkflowError> for ApiError {
    fn from(e: WorkflowError) -> Self {
        Self(e.into())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

fn status_for(err: &CampaignError) -> StatusCode {
    match err {
        CampaignError::Tool(e) => match e {
            ToolError::SchemaValidation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ToolError::BackendUnavailable { .. } => StatusCode::BAD_GATEWAY,
            ToolError::NotFound { .. } => StatusCode::NOT_FOUND,
            ToolError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        },
        CampaignError::Workflow(e) => match e {
            WorkflowError::PolicyViolation { .. } => StatusCode::CONFLICT,
            WorkflowError::SchemaValidation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            WorkflowError::StepFailed { source, .. } => status_for(source),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        CampaignError::ToolNotFound { .. } | CampaignError::AgentNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        CampaignError::Model(ModelError::ApiKeyMissing(_)) => StatusCode::SERVICE_UNAVAILABLE,
        CampaignError::Model(_) | CampaignError::Http(_) => StatusCode::BAD_GATEWAY,
        CampaignError::Json(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_tools(State(campaign): State<AppState>) -> Json<Value> {
    let tools: Vec<Value> = campaign
        .registry()
        .list()
        .await
        .iter()
        .map(|t| describe(t.as_ref()))
        .collect();
    Json(json!(tools))
}

async fn call_tool(
    State(campaign): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(campaign.call_tool(&id, input).await?))
}

async fn list_agents(State(campaign): State<AppState>) -> Json<Value> {
    let agents: Vec<Value> = campaign
        .descriptors()
        .map(|d| {
            let scorers: Vec<Value> = d
                .scorers()
                .iter()
                .map(|s| {
                    json!({
                        "name": s.name,
                        "scorer": s.scorer.name(),
                        "sampling": s.sampling,
                    })
                })
                .collect();
            json!({
                "name": d.name,
                "description": d.description,
                "model": d.model,
                "tools": d.tool_names(),
                "scorers": scorers,
            })
        })
        .collect();
    Json(json!(agents))
}

#[derive(Deserialize)]
struct GenerateRequest {
    prompt: String,
}

async fn generate(
    State(campaign): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<Value>, ApiError> {
    use crate::adk::agent::Agent;

    let agent = campaign.agent(&name)?;
    // Scoring stays detached and reports to the log.
    let response = agent.run(request.prompt).await?;
    Ok(Json(serde_json::to_value(response)?))
}

async fn describe_promotion_workflow(State(campaign): State<AppState>) -> Json<Value> {
    let workflow = campaign.workflow();
    let steps: Vec<Value> = workflow
        .steps()
        .iter()
        .map(|step| {
            json!({
                "id": step.id(),
                "inputSchema": step.input().map(|input| input.schema().clone()),
            })
        })
        .collect();
    Json(json!({
        "id": workflow.id(),
        "inputSchema": workflow.input_schema(),
        "steps": steps,
    }))
}

async fn run_promotion_workflow(
    State(campaign): State<AppState>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let result = campaign.run_workflow(input).await;
    let state = PromotionState::of(&result);
    let result = result?;
    Ok(Json(json!({
        "state": state,
        "workflow": result.workflow,
        "steps": result.steps,
        "output": result.output,
    })))
}
