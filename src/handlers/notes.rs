use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::Identity;
use crate::models::Note;
use crate::services::NoteService;
use crate::state::AppState;
use crate::store::NotePatch;

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// An unparseable path id can't name an existing note; report it exactly
/// like a nonexistent one.
fn parse_note_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound)
}

/// POST /notes - create a note, subject to the tenant's plan quota
pub async fn create_note(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let note = NoteService::new(state.store.clone())
        .create(
            &identity,
            payload.title.unwrap_or_default(),
            payload.content.unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /notes - all of this tenant's notes, newest first
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = NoteService::new(state.store.clone()).list(&identity).await?;
    Ok(Json(notes))
}

/// GET /notes/:id
pub async fn get_note(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    let note = NoteService::new(state.store.clone()).get(&identity, id).await?;
    Ok(Json(note))
}

/// PUT /notes/:id - partial update; omitted fields are unchanged
pub async fn update_note(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateNoteRequest>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    let note = NoteService::new(state.store.clone())
        .update(
            &identity,
            id,
            NotePatch {
                title: payload.title,
                content: payload.content,
            },
        )
        .await?;
    Ok(Json(note))
}

/// DELETE /notes/:id
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_note_id(&id)?;
    NoteService::new(state.store.clone())
        .delete(&identity, id)
        .await?;
    Ok(Json(json!({ "ok": true })))
}
