//! HTTP routes for the CourseHub API.

mod chapters;
mod courses;
mod health;
mod webhooks;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post, put};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::access::SessionVerifier;
use crate::catalog::Catalog;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub sessions: Arc<SessionVerifier>,
    /// Expected `x-webhook-secret` of payment callbacks. Callbacks are
    /// refused while unset.
    pub webhook_secret: Option<Arc<str>>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/categories",
            get(courses::list_categories).post(courses::create_category),
        )
        .route(
            "/api/courses",
            get(courses::list_courses).post(courses::create_course),
        )
        .route(
            "/api/courses/{course_id}",
            get(courses::course_detail).patch(courses::update_course),
        )
        .route("/api/courses/{course_id}/publish", patch(courses::publish_course))
        .route("/api/courses/{course_id}/outline", get(courses::course_outline))
        .route(
            "/api/courses/{course_id}/attachments",
            post(courses::add_attachment),
        )
        .route(
            "/api/courses/{course_id}/chapters",
            post(chapters::create_chapter),
        )
        .route(
            "/api/courses/{course_id}/chapters/reorder",
            put(chapters::reorder_chapters),
        )
        .route(
            "/api/courses/{course_id}/chapters/{chapter_id}",
            get(chapters::chapter_page).patch(chapters::update_chapter),
        )
        .route(
            "/api/courses/{course_id}/chapters/{chapter_id}/publish",
            patch(chapters::publish_chapter),
        )
        .route(
            "/api/courses/{course_id}/chapters/{chapter_id}/video",
            put(chapters::set_video),
        )
        .route(
            "/api/courses/{course_id}/chapters/{chapter_id}/progress",
            put(chapters::set_progress),
        )
        .route("/api/webhooks/purchase", post(webhooks::purchase))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve `app` until `shutdown` resolves. In-flight requests are allowed to
/// finish before this returns.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
