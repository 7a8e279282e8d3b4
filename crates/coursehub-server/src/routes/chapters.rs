//! Chapter handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use super::AppState;
use crate::access::Identity;
use crate::catalog::{ChapterPosition, ChapterUpdate};
use crate::error::ApiResult;
use crate::storage::{Chapter, MuxData, UserProgress};
use crate::view::ChapterPage;

#[derive(Debug, Deserialize)]
pub struct CreateChapterRequest {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub list: Vec<ChapterPosition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub is_published: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    #[serde(default)]
    pub asset_id: String,
    pub playback_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    pub is_completed: bool,
}

/// `POST /api/courses/{course_id}/chapters`
pub async fn create_chapter(
    State(state): State<AppState>,
    identity: Identity,
    Path(course_id): Path<String>,
    body: Result<Json<CreateChapterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Chapter>)> {
    let Json(req) = body?;
    let chapter = state
        .catalog
        .create_chapter(identity.as_str(), &course_id, &req.title)
        .await?;
    Ok((StatusCode::CREATED, Json(chapter)))
}

/// `PUT /api/courses/{course_id}/chapters/reorder`
pub async fn reorder_chapters(
    State(state): State<AppState>,
    identity: Identity,
    Path(course_id): Path<String>,
    body: Result<Json<ReorderRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<Chapter>>> {
    let Json(req) = body?;
    Ok(Json(
        state
            .catalog
            .reorder_chapters(identity.as_str(), &course_id, &req.list)
            .await?,
    ))
}

/// `GET /api/courses/{course_id}/chapters/{chapter_id}`
pub async fn chapter_page(
    State(state): State<AppState>,
    identity: Identity,
    Path((course_id, chapter_id)): Path<(String, String)>,
) -> ApiResult<Json<ChapterPage>> {
    Ok(Json(
        state
            .catalog
            .chapter_page(identity.as_str(), &course_id, &chapter_id)
            .await?,
    ))
}

/// `PATCH /api/courses/{course_id}/chapters/{chapter_id}`
pub async fn update_chapter(
    State(state): State<AppState>,
    identity: Identity,
    Path((course_id, chapter_id)): Path<(String, String)>,
    body: Result<Json<ChapterUpdate>, JsonRejection>,
) -> ApiResult<Json<Chapter>> {
    let Json(update) = body?;
    Ok(Json(
        state
            .catalog
            .update_chapter(identity.as_str(), &course_id, &chapter_id, &update)
            .await?,
    ))
}

/// `PATCH /api/courses/{course_id}/chapters/{chapter_id}/publish`
pub async fn publish_chapter(
    State(state): State<AppState>,
    identity: Identity,
    Path((course_id, chapter_id)): Path<(String, String)>,
    body: Result<Json<PublishRequest>, JsonRejection>,
) -> ApiResult<Json<Chapter>> {
    let Json(req) = body?;
    Ok(Json(
        state
            .catalog
            .set_chapter_published(identity.as_str(), &course_id, &chapter_id, req.is_published)
            .await?,
    ))
}

/// `PUT /api/courses/{course_id}/chapters/{chapter_id}/video`
pub async fn set_video(
    State(state): State<AppState>,
    identity: Identity,
    Path((course_id, chapter_id)): Path<(String, String)>,
    body: Result<Json<VideoRequest>, JsonRejection>,
) -> ApiResult<Json<MuxData>> {
    let Json(req) = body?;
    Ok(Json(
        state
            .catalog
            .set_video_asset(
                identity.as_str(),
                &course_id,
                &chapter_id,
                &req.asset_id,
                req.playback_id.as_deref(),
            )
            .await?,
    ))
}

/// `PUT /api/courses/{course_id}/chapters/{chapter_id}/progress`
pub async fn set_progress(
    State(state): State<AppState>,
    identity: Identity,
    Path((course_id, chapter_id)): Path<(String, String)>,
    body: Result<Json<ProgressRequest>, JsonRejection>,
) -> ApiResult<Json<UserProgress>> {
    let Json(req) = body?;
    Ok(Json(
        state
            .catalog
            .set_progress(identity.as_str(), &course_id, &chapter_id, req.is_completed)
            .await?,
    ))
}
