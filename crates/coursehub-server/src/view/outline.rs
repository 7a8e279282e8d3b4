//! Course outline with the requester's progress.

use std::collections::HashSet;

use serde::Serialize;

use crate::storage::{Course, CourseDatabase, DatabaseError};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineChapter {
    pub id: String,
    pub title: String,
    pub position: i64,
    pub is_free: bool,
    pub is_locked: bool,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseOutline {
    pub course: Course,
    pub chapters: Vec<OutlineChapter>,
    pub is_purchased: bool,
    /// Completed published chapters over published chapters, 0 to 100.
    pub progress_percentage: f64,
}

/// Published chapters of a published course in position order, flagged with
/// the user's access and completion. `None` if the course is not published.
pub async fn get_course_outline(
    db: &CourseDatabase,
    course_id: &str,
    user_id: &str,
) -> Result<Option<CourseOutline>, DatabaseError> {
    let Some(course) = db.get_published_course(course_id).await? else {
        return Ok(None);
    };
    let is_purchased = db.get_purchase(user_id, &course.id).await?.is_some();
    let completed: HashSet<String> = db
        .completed_chapter_ids(user_id, &course.id)
        .await?
        .into_iter()
        .collect();

    let chapters: Vec<OutlineChapter> = db
        .list_published_chapters(&course.id)
        .await?
        .into_iter()
        .map(|c| OutlineChapter {
            is_locked: !c.is_free && !is_purchased,
            is_completed: completed.contains(&c.id),
            id: c.id,
            title: c.title,
            position: c.position,
            is_free: c.is_free,
        })
        .collect();

    let progress_percentage = progress_percentage(completed.len(), chapters.len());

    Ok(Some(CourseOutline {
        course,
        chapters,
        is_purchased,
        progress_percentage,
    }))
}

#[allow(clippy::cast_precision_loss)]
pub fn progress_percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}
