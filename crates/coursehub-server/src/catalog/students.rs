//! Purchase and progress operations.

use tracing::{info, instrument, warn};

use super::{Catalog, new_id, validate};
use crate::error::{ApiError, ApiResult};
use crate::storage::{Purchase, UserProgress};
use crate::view::{self, ChapterPage, CourseOutline};

impl Catalog {
    /// Record a completed payment. Recording the same purchase twice is a
    /// no-op returning the original row.
    #[instrument(skip(self))]
    pub async fn record_purchase(&self, user_id: &str, course_id: &str) -> ApiResult<Purchase> {
        let user_id = validate::required("User id", user_id)?;
        let course = self
            .db
            .get_published_course(course_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Course {course_id}")))?;

        let purchase = self.db.create_purchase(&new_id(), user_id, &course.id).await?;
        info!(course_id = %course.id, purchase_id = %purchase.id, "Purchase recorded");
        Ok(purchase)
    }

    /// Set the completion flag of a chapter for a user. Only chapters the
    /// user may watch accept progress.
    #[instrument(skip(self))]
    pub async fn set_progress(
        &self,
        user_id: &str,
        course_id: &str,
        chapter_id: &str,
        is_completed: bool,
    ) -> ApiResult<UserProgress> {
        let chapter_view = view::get_chapter_view(&self.db, course_id, chapter_id, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Chapter {chapter_id}")))?;

        if !view::can_access(&chapter_view.chapter, chapter_view.purchase.as_ref()) {
            warn!(user_id, chapter_id, "Progress rejected on locked chapter");
            return Err(ApiError::Authorization);
        }

        let progress = self
            .db
            .upsert_progress(&new_id(), user_id, &chapter_view.chapter.id, is_completed)
            .await?;
        info!(chapter_id, is_completed, "Progress updated");
        Ok(progress)
    }

    pub async fn chapter_page(
        &self,
        user_id: &str,
        course_id: &str,
        chapter_id: &str,
    ) -> ApiResult<ChapterPage> {
        view::get_chapter_view(&self.db, course_id, chapter_id, user_id)
            .await?
            .map(ChapterPage::from)
            .ok_or_else(|| ApiError::not_found(format!("Chapter {chapter_id}")))
    }

    pub async fn course_outline(&self, user_id: &str, course_id: &str) -> ApiResult<CourseOutline> {
        view::get_course_outline(&self.db, course_id, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Course {course_id}")))
    }
}
