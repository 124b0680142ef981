use std::io;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use log::info;
use serde::{Deserialize, Serialize};

use super::{empty_input_warning, is_blank, render_page, Action, Panel, Predictor, Shell, View};
use crate::config::ServerConfig;
use crate::labels::ClassKey;
use crate::registry::TaskRegistry;
use crate::Task;

/// Shared, read-only state behind every handler
pub struct AppState {
    pub shell: Shell<Box<dyn Predictor>>,
}

impl AppState {
    pub fn new(registry: TaskRegistry) -> Arc<Self> {
        Self::with_predictor(registry)
    }

    /// State backed by any [`Predictor`] instead of a loaded registry
    pub fn with_predictor(predictor: impl Predictor + 'static) -> Arc<Self> {
        Arc::new(Self {
            shell: Shell::new(Box::new(predictor)),
        })
    }
}

/// Form posted by the page's buttons
#[derive(Debug, Deserialize)]
pub struct ShellForm {
    #[serde(default)]
    pub view: String,
    pub action: String,
    pub text: Option<String>,
}

/// Body of `POST /api/predict/:task`
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub task: Task,
    pub class: ClassKey,
    pub label: String,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Serialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
}

fn api_error(status: StatusCode, error_type: &str, message: impl Into<String>) -> Response {
    let body = ApiError {
        error: ApiErrorDetail {
            message: message.into(),
            error_type: error_type.to_string(),
        },
    };
    (status, Json(body)).into_response()
}

async fn index() -> Html<String> {
    Html(render_page(View::Home, &Panel::Nothing, ""))
}

async fn interact(State(state): State<Arc<AppState>>, Form(form): Form<ShellForm>) -> Response {
    let view = match form.view.parse::<View>() {
        Ok(view) => view,
        Err(e) => return (StatusCode::BAD_REQUEST, e).into_response(),
    };
    let action = match Action::from_form(&form.action, form.text) {
        Ok(action) => action,
        Err(e) => return (StatusCode::BAD_REQUEST, e).into_response(),
    };

    let outcome = state.shell.handle(view, action);
    let status = match outcome.panel {
        Panel::Error(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };
    (status, Html(render_page(outcome.view, &outcome.panel, &outcome.text))).into_response()
}

async fn api_predict(
    State(state): State<Arc<AppState>>,
    Path(task): Path<String>,
    request: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let task = match task.parse::<Task>() {
        Ok(task) => task,
        Err(e) => return api_error(StatusCode::NOT_FOUND, "unknown_task", e.to_string()),
    };
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => return api_error(rejection.status(), "invalid_request", rejection.body_text()),
    };
    if is_blank(&request.text) {
        return api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "empty_input",
            empty_input_warning(task),
        );
    }

    match state.shell.predictor().predict(task, &request.text) {
        Ok(prediction) => Json(PredictResponse {
            task,
            class: prediction.class,
            label: prediction.label,
        })
        .into_response(),
        Err(e) => {
            log::error!("[{}] Prediction failed: {}", task, e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "prediction_error", e.to_string())
        }
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let predictor = state.shell.predictor();
    let tasks: Vec<serde_json::Value> = Task::ALL
        .iter()
        .map(|&task| match predictor.info(task) {
            Some(info) => serde_json::json!({
                "task": task,
                "classes": info.classes.len(),
                "features": info.n_features,
            }),
            None => serde_json::json!({ "task": task }),
        })
        .collect();

    Json(serde_json::json!({
        "status": "healthy",
        "tasks": tasks,
    }))
}

/// Build the axum [`Router`] with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index).post(interact))
        .route("/api/predict/:task", post(api_predict))
        .route("/health", get(health))
        .with_state(state)
}

/// Binds `config.listen_addr` and serves until the process exits
pub async fn serve(config: &ServerConfig, state: Arc<AppState>) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await
}
