//! HTTP routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prompt_arcade::core::pipeline::{GameForge, PipelineError};
use prompt_arcade::schema::category::CategoryId;
use prompt_arcade::schema::modifier::ModifierTag;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::app::App;
use crate::llm;
use crate::store::StoredGame;

/// All API routes, without state or middleware.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/categories", get(list_categories))
        .route("/api/classify", post(classify))
        .route("/api/generate", post(generate))
        .route("/api/games/{id}", get(get_game))
        .route("/api/games/{id}/play", get(play_game))
}

/// The routes with state, tracing and CORS attached.
pub fn router(app: Arc<App>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    routes()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app)
}

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub category: CategoryId,
    pub confidence: f32,
    pub modifiers: Vec<ModifierTag>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub embellish: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub keywords: Vec<String>,
    pub titles: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> &'static str {
    "OK"
}

async fn list_categories(State(app): State<Arc<App>>) -> Json<Vec<CategorySummary>> {
    let categories = app
        .forge
        .catalog()
        .categories()
        .iter()
        .map(|cat| CategorySummary {
            id: cat.id.clone(),
            keywords: cat.keywords.clone(),
            titles: cat.titles.clone(),
        })
        .collect();
    Json(categories)
}

async fn classify(
    State(app): State<Arc<App>>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let Json(req) = payload?;
    GameForge::validate_prompt(&req.prompt)?;

    let result = app.forge.classify(&req.prompt);
    Ok(Json(ClassifyResponse {
        category: result.category,
        confidence: result.confidence,
        modifiers: result.modifiers,
    }))
}

async fn generate(
    State(app): State<Arc<App>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<StoredGame>, ApiError> {
    let Json(req) = payload?;
    let mut plan = app.forge.plan(&req.prompt, req.seed)?;

    let mut embellished = false;
    if req.embellish {
        match &app.llm {
            Some(llm) => {
                if let Some(intro) =
                    llm::embellish_intro(&**llm, &plan.choice, &req.prompt).await
                {
                    plan.choice.intro = intro;
                    embellished = true;
                }
            }
            None => tracing::debug!("Embellishment requested but no LLM is configured"),
        }
    }

    let generation = app.forge.complete(plan, &req.prompt)?;
    let game = StoredGame::from_generation(&req.prompt, generation, embellished);
    app.store.insert(game.clone()).await;

    tracing::info!(id = %game.id, category = %game.category, "Stored generated game");
    Ok(Json(game))
}

async fn get_game(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<StoredGame>, ApiError> {
    Ok(Json(find_game(&app, &id).await?))
}

async fn play_game(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    Ok(Html(find_game(&app, &id).await?.document))
}

async fn find_game(app: &App, id: &str) -> Result<StoredGame, ApiError> {
    let not_found = || ApiError::NotFound(id.to_string());
    let uuid = Uuid::parse_str(id).map_err(|_| not_found())?;
    app.store.get(&uuid).await.ok_or_else(not_found)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("malformed request body: {0}")]
    BadRequest(String),
    #[error("game '{0}' not found (unknown or evicted)")]
    NotFound(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        use prompt_arcade::core::pipeline::ErrorKind;

        match self {
            ApiError::Pipeline(e) => match e.kind() {
                ErrorKind::InvalidPrompt => (StatusCode::BAD_REQUEST, e.kind().as_str()),
                kind => (StatusCode::INTERNAL_SERVER_ERROR, kind.as_str()),
            },
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            tracing::error!(error = %self, kind, "Request failed");
        }
        let body = ErrorBody {
            error: kind.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
