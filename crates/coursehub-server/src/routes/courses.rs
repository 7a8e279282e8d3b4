//! Course and category handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use super::AppState;
use crate::access::Identity;
use crate::catalog::{CourseDetail, CourseUpdate};
use crate::error::{ApiError, ApiResult};
use crate::storage::{Attachment, Category, Course};
use crate::view::CourseOutline;

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub is_published: bool,
}

#[derive(Debug, Deserialize)]
pub struct AttachmentRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub url: String,
}

/// `GET /api/categories`
pub async fn list_categories(
    State(state): State<AppState>,
    _identity: Identity,
) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.catalog.list_categories().await?))
}

/// `POST /api/categories`
pub async fn create_category(
    State(state): State<AppState>,
    identity: Identity,
    body: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let Json(req) = body?;
    let category = state
        .catalog
        .create_category(identity.as_str(), &req.name)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `GET /api/courses`: the caller's own courses.
pub async fn list_courses(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(
        state.catalog.list_teacher_courses(identity.as_str()).await?,
    ))
}

/// `POST /api/courses`
pub async fn create_course(
    State(state): State<AppState>,
    identity: Identity,
    body: Result<Json<CreateCourseRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    // Authorization is decided before the body is looked at.
    if !state.catalog.is_teacher(identity.as_str()) {
        return Err(ApiError::Authorization);
    }
    let Json(req) = body?;
    let course = state
        .catalog
        .create_course(identity.as_str(), &req.title)
        .await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// `GET /api/courses/{course_id}`
pub async fn course_detail(
    State(state): State<AppState>,
    identity: Identity,
    Path(course_id): Path<String>,
) -> ApiResult<Json<CourseDetail>> {
    Ok(Json(
        state
            .catalog
            .course_detail(identity.as_str(), &course_id)
            .await?,
    ))
}

/// `PATCH /api/courses/{course_id}`
pub async fn update_course(
    State(state): State<AppState>,
    identity: Identity,
    Path(course_id): Path<String>,
    body: Result<Json<CourseUpdate>, JsonRejection>,
) -> ApiResult<Json<Course>> {
    let Json(update) = body?;
    Ok(Json(
        state
            .catalog
            .update_course(identity.as_str(), &course_id, &update)
            .await?,
    ))
}

/// `PATCH /api/courses/{course_id}/publish`
pub async fn publish_course(
    State(state): State<AppState>,
    identity: Identity,
    Path(course_id): Path<String>,
    body: Result<Json<PublishRequest>, JsonRejection>,
) -> ApiResult<Json<Course>> {
    let Json(req) = body?;
    Ok(Json(
        state
            .catalog
            .set_course_published(identity.as_str(), &course_id, req.is_published)
            .await?,
    ))
}

/// `GET /api/courses/{course_id}/outline`
pub async fn course_outline(
    State(state): State<AppState>,
    identity: Identity,
    Path(course_id): Path<String>,
) -> ApiResult<Json<CourseOutline>> {
    Ok(Json(
        state
            .catalog
            .course_outline(identity.as_str(), &course_id)
            .await?,
    ))
}

/// `POST /api/courses/{course_id}/attachments`
pub async fn add_attachment(
    State(state): State<AppState>,
    identity: Identity,
    Path(course_id): Path<String>,
    body: Result<Json<AttachmentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Attachment>)> {
    let Json(req) = body?;
    let attachment = state
        .catalog
        .add_attachment(identity.as_str(), &course_id, req.name.as_deref(), &req.url)
        .await?;
    Ok((StatusCode::CREATED, Json(attachment)))
}
