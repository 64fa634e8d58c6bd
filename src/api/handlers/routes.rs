use crate::AppState;
use crate::api::error::AppError;
use crate::models::{FileRecord, UploadQuery, UploadResponse};
use crate::services::upload_handler::UploadHandler;
use axum::{
    Json,
    extract::{FromRequest, Multipart, Query, Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

/// Handler selected for a request, keyed on its HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Get,
    Post,
    Options,
    Default,
}

impl From<&Method> for Route {
    fn from(method: &Method) -> Self {
        match *method {
            Method::GET => Route::Get,
            Method::POST => Route::Post,
            Method::OPTIONS => Route::Options,
            _ => Route::Default,
        }
    }
}

/// Entry point for every path that is not the push socket.
pub async fn handler(State(state): State<AppState>, request: Request) -> Response {
    match Route::from(request.method()) {
        Route::Get => list_files(State(state)).await.into_response(),
        Route::Post => {
            let query = Query::<UploadQuery>::try_from_uri(request.uri())
                .map(|Query(query)| query)
                .unwrap_or_default();

            match Multipart::from_request(request, &state).await {
                Ok(multipart) => upload_files(State(state), Query(query), multipart)
                    .await
                    .into_response(),
                Err(rejection) => rejection.into_response(),
            }
        }
        Route::Options => StatusCode::NO_CONTENT.into_response(),
        Route::Default => "Hello World".into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Files in the downloads folder", body = Vec<FileRecord>),
        (status = 500, description = "Downloads folder unreadable")
    ),
    tag = "files"
)]
pub async fn list_files(
    State(state): State<AppState>,
) -> Result<Json<Vec<FileRecord>>, AppError> {
    let files = state
        .file_helper
        .get_file_status(&state.config.downloads_folder)
        .await?;
    Ok(Json(files))
}

#[utoipa::path(
    post,
    path = "/",
    request_body(content = Multipart, description = "One or more file parts"),
    responses(
        (status = 200, description = "All parts written", body = UploadResponse),
        (status = 400, description = "Malformed multipart body or file name"),
        (status = 500, description = "Write failure")
    ),
    tag = "files"
)]
pub async fn upload_files(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let socket_id = query.socket_id.unwrap_or_default();
    let mut handler = UploadHandler::new(
        state.notifier.clone(),
        socket_id.clone(),
        &state.config.downloads_folder,
        state.config.message_time_delay_ms,
    );

    let response = handler
        .register_events(multipart, |summary| {
            let total: u64 = summary.files.iter().map(|f| f.bytes_processed).sum();
            tracing::info!(
                "📦 Upload for {} done: {} file(s), {} bytes",
                socket_id,
                summary.files.len(),
                total
            );
            Json(UploadResponse::success())
        })
        .await?;

    Ok(response)
}
