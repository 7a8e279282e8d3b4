//! Read-side aggregation for students.
//!
//! Nothing in this module writes to the database.

mod outline;
mod page;


use serde::Serialize;

use crate::storage::{
    Attachment, Chapter, Course, CourseDatabase, DatabaseError, MuxData, Purchase, UserProgress,
};

pub use outline::{CourseOutline, OutlineChapter, get_course_outline};
pub use page::{Banner, ChapterPage};

/// Everything needed to render one chapter for one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterView {
    pub chapter: Chapter,
    pub course: Course,
    /// Course attachments, only for purchasers.
    pub attachments: Vec<Attachment>,
    /// Video ids, only when the chapter is free or purchased.
    pub mux_data: Option<MuxData>,
    pub user_progress: Option<UserProgress>,
    pub purchase: Option<Purchase>,
    pub next_chapter: Option<Chapter>,
}

/// Whether a user may see the full content of a chapter.
pub const fn can_access(chapter: &Chapter, purchase: Option<&Purchase>) -> bool {
    chapter.is_free || purchase.is_some()
}

/// Fetch a published chapter of a published course with the user's
/// purchase, progress and the next published chapter.
///
/// Returns `None` when the chapter is missing, unpublished, belongs to
/// another course, or the course is unpublished.
pub async fn get_chapter_view(
    db: &CourseDatabase,
    course_id: &str,
    chapter_id: &str,
    user_id: &str,
) -> Result<Option<ChapterView>, DatabaseError> {
    let Some(course) = db.get_published_course(course_id).await? else {
        return Ok(None);
    };
    let chapter = match db.get_course_chapter(&course.id, chapter_id).await {
        Ok(chapter) if chapter.is_published => chapter,
        Ok(_) | Err(DatabaseError::NotFound(_)) => return Ok(None),
        Err(e) => return Err(e),
    };

    let purchase = db.get_purchase(user_id, &course.id).await?;

    let attachments = if purchase.is_some() {
        db.list_attachments(&course.id).await?
    } else {
        Vec::new()
    };

    let mux_data = if can_access(&chapter, purchase.as_ref()) {
        db.get_mux_data(&chapter.id).await?
    } else {
        None
    };

    let next_chapter = db
        .next_published_chapter(&course.id, chapter.position)
        .await?;
    let user_progress = db.get_progress(user_id, &chapter.id).await?;

    Ok(Some(ChapterView {
        chapter,
        course,
        attachments,
        mux_data,
        user_progress,
        purchase,
        next_chapter,
    }))
}
