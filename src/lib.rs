pub mod convert;
pub mod templates;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use convert::{ConvertError, ConvertOptions, convert_csv_bytes};
use templates::{render_converted_ride, render_landing_page};

/// Converted documents waiting to be downloaded, keyed by the token embedded
/// in the rendered results page.
#[derive(Clone, Default)]
struct AppState {
    downloads: Arc<Mutex<HashMap<Uuid, Vec<u8>>>>,
}

pub fn build_app() -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/upload", post(handle_upload))
        .route("/download/:id", get(handle_download))
        .with_state(AppState::default())
}

async fn landing_page() -> Html<String> {
    Html(render_landing_page())
}

async fn handle_upload(State(state): State<AppState>, mut multipart: Multipart) -> impl IntoResponse {
    let mut uploaded: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            match field.bytes().await {
                Ok(bytes) => uploaded = Some(bytes.to_vec()),
                Err(err) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read uploaded file: {err}"),
                    )
                        .into_response();
                }
            }
        }
    }

    let file_bytes = match uploaded {
        Some(bytes) => bytes,
        None => return (StatusCode::BAD_REQUEST, "No file provided").into_response(),
    };

    match convert_csv_bytes(&file_bytes, &ConvertOptions::from_local_clock()) {
        Ok(ride) => {
            tracing::info!(
                samples = ride.summary.sample_count,
                firmware = %ride.device.firmware,
                "converted uploaded workout"
            );
            let token = Uuid::new_v4();
            let page = render_converted_ride(&ride, &format!("/download/{token}"));
            state.downloads.lock().await.insert(token, ride.tcx_bytes);
            Html(page).into_response()
        }
        Err(err) => render_conversion_error(err),
    }
}

async fn handle_download(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let token = match Uuid::parse_str(&id) {
        Ok(token) => token,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    };

    match state.downloads.lock().await.get(&token) {
        Some(bytes) => (
            [
                (header::CONTENT_TYPE, "application/vnd.garmin.tcx+xml"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"workout.tcx\"",
                ),
            ],
            bytes.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn render_conversion_error(error: ConvertError) -> axum::response::Response {
    tracing::warn!(%error, "rejected workout upload");
    (StatusCode::BAD_REQUEST, error.to_string()).into_response()
}
