use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::crypto::SignatureAlgorithm;
use crate::domain::{SignatureDevice, SignatureDeviceService};
use crate::error::Error;
use crate::persistence::InMemoryDeviceRepository;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SignatureDeviceService>,
}

impl AppState {
    pub fn new() -> Self {
        let repo = Arc::new(InMemoryDeviceRepository::new());
        Self {
            service: Arc::new(SignatureDeviceService::new(repo)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v0/health", get(health))
        .route("/api/v0/devices", get(list_devices).post(create_device))
        .route("/api/v0/devices/{device_id}", get(get_device))
        .route("/api/v0/devices/{device_id}/signatures", post(sign_data))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

pub async fn run(host: String, port: u16) -> Result<()> {
    let state = AppState::new();

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(%host, port, "listening");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Outward projection of a device. Chain state stays domain-internal.
#[derive(Debug, Serialize)]
struct DeviceResponse {
    id: String,
    algorithm: SignatureAlgorithm,
    label: String,
}

impl From<&SignatureDevice> for DeviceResponse {
    fn from(device: &SignatureDevice) -> Self {
        Self {
            id: device.id().to_owned(),
            algorithm: device.algorithm(),
            label: device.label().to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateDeviceRequest {
    id: String,
    algorithm: String,
    #[serde(default)]
    label: String,
}

#[derive(Debug, Deserialize)]
struct SignRequest {
    data: String,
}

/// Translates a body rejection into the error envelope. A decodable-but-
/// invalid body is caller error (400); size and content-type rejections
/// keep their transport statuses (413, 415).
fn reject_body(rejection: JsonRejection) -> Response {
    let status = match rejection.status() {
        StatusCode::UNPROCESSABLE_ENTITY => StatusCode::BAD_REQUEST,
        status => status,
    };
    let errors = vec![
        status.canonical_reason().unwrap_or("error").to_owned(),
        rejection.body_text(),
    ];
    (status, Json(json!({ "errors": errors }))).into_response()
}

async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "pass", "version": "v0" })),
    )
}

async fn list_devices(State(state): State<AppState>) -> Result<Response, Error> {
    let devices = state.service.get_all()?;
    let data: Vec<DeviceResponse> = devices
        .iter()
        .map(|device| DeviceResponse::from(device.as_ref()))
        .collect();

    Ok((StatusCode::OK, Json(json!({ "data": data }))).into_response())
}

async fn create_device(
    State(state): State<AppState>,
    body: Result<Json<CreateDeviceRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return Ok(reject_body(rejection)),
    };

    let algorithm: SignatureAlgorithm = request.algorithm.parse()?;

    // Key generation is CPU-bound; keep it off the async workers.
    let service = Arc::clone(&state.service);
    let device = tokio::task::spawn_blocking(move || {
        service.create(request.id, algorithm, request.label)
    })
    .await
    .map_err(anyhow::Error::from)??;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "data": DeviceResponse::from(device.as_ref()) })),
    )
        .into_response())
}

async fn get_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Response, Error> {
    let device = state.service.get_by_id(&device_id)?;

    Ok((
        StatusCode::OK,
        Json(json!({ "data": DeviceResponse::from(device.as_ref()) })),
    )
        .into_response())
}

async fn sign_data(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    body: Result<Json<SignRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return Ok(reject_body(rejection)),
    };

    let service = Arc::clone(&state.service);
    let signature = tokio::task::spawn_blocking(move || service.sign(&device_id, &request.data))
        .await
        .map_err(anyhow::Error::from)??;

    Ok((StatusCode::CREATED, Json(json!({ "data": signature }))).into_response())
}
