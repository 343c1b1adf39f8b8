//! Router for the chat API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::openai::{Message, complete};

type SharedState = Arc<RwLock<AppState>>;

/// List all chat files, most recent first
async fn chat_files(
    State(state): State<SharedState>,
) -> Result<axum::Json<Vec<public::ChatFile>>, ApiError> {
    let store = state.read().expect("Unable to read shared state").store.clone();
    let files = store
        .list()
        .await?
        .into_iter()
        .map(|filename| public::ChatFile { filename })
        .collect();

    Ok(axum::Json(files))
}

/// Get a single chat transcript by filename
async fn get_chat(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
) -> Result<axum::Json<Vec<Message>>, ApiError> {
    let store = state.read().expect("Unable to read shared state").store.clone();
    let transcript = store
        .read(&filename)
        .await?
        .ok_or_else(|| ApiError::not_found("Chat file not found"))?;

    Ok(axum::Json(transcript))
}

/// Create a new chat from the submitted transcript
async fn new_chat(
    State(state): State<SharedState>,
    axum::Json(payload): axum::Json<public::ChatMessages>,
) -> Result<axum::Json<public::ChatFile>, ApiError> {
    let store = state.read().expect("Unable to read shared state").store.clone();
    let filename = store.create(&payload.messages).await?;

    tracing::debug!("Created chat {}", filename);

    Ok(axum::Json(public::ChatFile { filename }))
}

/// Forward the submitted transcript to the completion provider and
/// return the generated reply
async fn chat_handler(
    State(state): State<SharedState>,
    axum::Json(payload): axum::Json<public::ChatMessages>,
) -> Result<axum::Json<Message>, ApiError> {
    let (api_hostname, api_key, default_model) = {
        let shared_state = state.read().expect("Unable to read shared state");
        (
            shared_state.config.openai_api_hostname.clone(),
            shared_state.config.openai_api_key.clone(),
            shared_state.config.openai_model.clone(),
        )
    };
    let model = payload.model.unwrap_or(default_model);

    let reply = complete(&payload.messages, &api_hostname, &api_key, &model).await?;

    Ok(axum::Json(reply))
}

/// Replace a chat's transcript wholesale
async fn update_chat(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
    axum::Json(payload): axum::Json<public::ChatMessages>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.read().expect("Unable to read shared state").store.clone();

    if !store.update(&filename, &payload.messages).await? {
        return Err(ApiError::not_found("Chat file not found"));
    }

    Ok(axum::Json(public::StatusResponse::new("updated")))
}

/// Delete a chat
async fn delete_chat(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.read().expect("Unable to read shared state").store.clone();

    if !store.delete(&filename).await? {
        return Err(ApiError::not_found("Chat file not found"));
    }

    Ok(axum::Json(public::StatusResponse::new("deleted")))
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/chat-files", get(chat_files))
        .route("/new-chat", post(new_chat))
        .route("/chat", post(chat_handler))
        .route(
            "/chat/{filename}",
            get(get_chat).put(update_chat).delete(delete_chat),
        )
}
