pub mod broadcast;
pub mod cloud;
pub mod config;
pub mod error;
pub mod template;

pub use config::Config;

use self::broadcast::{run_broadcast, BroadcastReport, Recipient};
use self::cloud::{approved_templates, CloudApiClient, TemplateSender};
use self::config::load_config;
use self::error::ApiError;
use self::template::{analyze_template, analyze_templates, Template, TemplateAnalysis, UserInputValues, ValidationReport};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const TOKEN_HEADER: &str = "X-Wa-Templates-Token";

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub cloud: CloudApiClient,
    pub sender: Arc<dyn TemplateSender>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let cloud = CloudApiClient::new(reqwest::Client::new(), config.whatsapp.clone());
        Self {
            config,
            sender: Arc::new(cloud.clone()),
            cloud,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TemplateValuesRequest {
    pub template: Template,
    #[serde(default)]
    pub values: UserInputValues,
}

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub template: Template,
    #[serde(default)]
    pub values: UserInputValues,
    pub recipients: Vec<Recipient>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateListing {
    pub ok: bool,
    pub approved_templates: Vec<Template>,
    pub analyses: Vec<TemplateAnalysis>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn create_app() -> anyhow::Result<(AppState, Router)> {
    let config = load_config();
    if config.whatsapp.access_token.is_none() {
        info!("no WhatsApp access token configured; listing and sending are disabled");
    }
    let state = AppState::new(config);
    let app = router(state.clone());
    Ok((state, app))
}

pub fn router(state: AppState) -> Router {
    let authed_routes = Router::new()
        .route("/v1/templates", get(list_templates))
        .route("/v1/templates/analyze", post(analyze))
        .route("/v1/templates/validate", post(validate))
        .route("/v1/templates/build", post(build))
        .route("/v1/broadcasts/send", post(send_broadcast))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let public_routes = Router::new().route("/v1/health", get(health));

    Router::new()
        .merge(authed_routes)
        .merge(public_routes)
        .with_state(state)
}

async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> impl IntoResponse {
    if let Some(token) = state.config.auth.token.as_ref() {
        let header = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok());
        if header != Some(token.as_str()) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }
    next.run(req).await
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn list_templates(State(state): State<AppState>) -> Result<Json<TemplateListing>, ApiError> {
    let templates = state.cloud.list_templates().await?;
    let approved = approved_templates(templates, &state.config.templates.excluded);
    let analyses = analyze_templates(&approved);
    Ok(Json(TemplateListing {
        ok: true,
        approved_templates: approved,
        analyses,
    }))
}

async fn analyze(Json(template): Json<Template>) -> Json<TemplateAnalysis> {
    Json(analyze_template(&template))
}

async fn validate(Json(req): Json<TemplateValuesRequest>) -> Json<ValidationReport> {
    let analysis = analyze_template(&req.template);
    Json(analysis.validate(&req.values))
}

async fn build(Json(req): Json<TemplateValuesRequest>) -> Result<impl IntoResponse, ApiError> {
    let analysis = analyze_template(&req.template);
    let report = analysis.validate(&req.values);
    if !report.valid {
        return Err(ApiError::Unprocessable {
            errors: report.errors,
        });
    }
    let components = analysis.build(&req.values);
    Ok(Json(json!({"ok": true, "components": components})))
}

async fn send_broadcast(
    State(state): State<AppState>,
    Json(req): Json<BroadcastRequest>,
) -> Result<Json<BroadcastReport>, ApiError> {
    if req.recipients.is_empty() {
        return Err(ApiError::BadRequest("no recipients".to_string()));
    }
    if req.template.name.trim().is_empty() {
        return Err(ApiError::BadRequest("template name is required".to_string()));
    }
    let analysis = analyze_template(&req.template);
    let delay = Duration::from_millis(state.config.broadcast.delay_ms);
    let report = run_broadcast(
        state.sender.as_ref(),
        &analysis,
        &req.values,
        &req.recipients,
        delay,
    )
    .await;
    Ok(Json(report))
}
