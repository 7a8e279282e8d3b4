//! Chapter authoring operations.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{info, instrument};

use super::{Catalog, new_id, validate};
use crate::error::{ApiError, ApiResult};
use crate::storage::{Chapter, ChapterPatch, MuxData};

/// Fields a teacher may change on a chapter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub is_free: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChapterPosition {
    pub id: String,
    pub position: i64,
}

impl Catalog {
    /// Append a chapter at `1 + max(position)` of the course.
    #[instrument(skip(self, title))]
    pub async fn create_chapter(
        &self,
        teacher_id: &str,
        course_id: &str,
        title: &str,
    ) -> ApiResult<Chapter> {
        let course = self.owned_course(teacher_id, course_id).await?;
        let title = validate::required("Chapter title", title)?;

        let chapter = self.db.create_chapter(&new_id(), &course.id, title).await?;
        info!(
            course_id = %course.id,
            chapter_id = %chapter.id,
            position = chapter.position,
            "Chapter created"
        );
        Ok(chapter)
    }

    #[instrument(skip(self, update))]
    pub async fn update_chapter(
        &self,
        teacher_id: &str,
        course_id: &str,
        chapter_id: &str,
        update: &ChapterUpdate,
    ) -> ApiResult<Chapter> {
        let course = self.owned_course(teacher_id, course_id).await?;
        let chapter = self.db.get_course_chapter(&course.id, chapter_id).await?;

        let patch = ChapterPatch {
            title: validate::optional("Title", update.title.as_deref())?,
            description: validate::optional("Description", update.description.as_deref())?,
            video_url: validate::optional("Video", update.video_url.as_deref())?,
            is_free: update.is_free,
        };
        if patch.is_empty() {
            return Err(ApiError::validation("No fields to update"));
        }

        let chapter = self.db.update_chapter(&chapter.id, &patch).await?;
        info!(chapter_id = %chapter.id, "Chapter updated");
        Ok(chapter)
    }

    /// Publish or unpublish a chapter.
    ///
    /// Publishing requires a description and a video. Unpublishing the last
    /// published chapter also unpublishes the course.
    #[instrument(skip(self))]
    pub async fn set_chapter_published(
        &self,
        teacher_id: &str,
        course_id: &str,
        chapter_id: &str,
        is_published: bool,
    ) -> ApiResult<Chapter> {
        let course = self.owned_course(teacher_id, course_id).await?;
        let chapter = self.db.get_course_chapter(&course.id, chapter_id).await?;

        if is_published && (chapter.description.is_none() || chapter.video_url.is_none()) {
            return Err(ApiError::validation(
                "Title, description and video are required to publish",
            ));
        }

        let chapter = self
            .db
            .set_chapter_published(&chapter.id, is_published)
            .await?;

        if !is_published
            && course.is_published
            && self.db.count_published_chapters(&course.id).await? == 0
        {
            self.db.set_course_published(&course.id, false).await?;
            info!(course_id = %course.id, "Course unpublished with its last chapter");
        }

        info!(chapter_id = %chapter.id, is_published, "Chapter publish state changed");
        Ok(chapter)
    }

    /// Reassign chapter positions. The list must name every chapter of the
    /// course exactly once, with distinct positions starting at 1.
    #[instrument(skip(self, list))]
    pub async fn reorder_chapters(
        &self,
        teacher_id: &str,
        course_id: &str,
        list: &[ChapterPosition],
    ) -> ApiResult<Vec<Chapter>> {
        let course = self.owned_course(teacher_id, course_id).await?;
        let existing: HashSet<String> = self
            .db
            .list_chapters(&course.id)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        let ids: HashSet<&str> = list.iter().map(|p| p.id.as_str()).collect();
        let positions: HashSet<i64> = list.iter().map(|p| p.position).collect();
        if ids.len() != list.len() || ids.len() != existing.len() {
            return Err(ApiError::validation("Reorder must list every chapter once"));
        }
        if ids.iter().any(|id| !existing.contains(*id)) {
            return Err(ApiError::validation("Reorder names a chapter outside the course"));
        }
        if positions.len() != list.len() || positions.iter().any(|p| *p < 1) {
            return Err(ApiError::validation("Positions must be distinct and positive"));
        }

        let pairs: Vec<(&str, i64)> = list.iter().map(|p| (p.id.as_str(), p.position)).collect();
        self.db.reorder_chapters(&course.id, &pairs).await?;
        info!(course_id = %course.id, count = pairs.len(), "Chapters reordered");

        Ok(self.db.list_chapters(&course.id).await?)
    }

    /// Store the ids the media service issued for a chapter's video.
    #[instrument(skip(self))]
    pub async fn set_video_asset(
        &self,
        teacher_id: &str,
        course_id: &str,
        chapter_id: &str,
        asset_id: &str,
        playback_id: Option<&str>,
    ) -> ApiResult<MuxData> {
        let course = self.owned_course(teacher_id, course_id).await?;
        let chapter = self.db.get_course_chapter(&course.id, chapter_id).await?;
        let asset_id = validate::required("Asset id", asset_id)?;
        let playback_id = validate::optional("Playback id", playback_id)?;

        let data = self
            .db
            .upsert_mux_data(&new_id(), &chapter.id, asset_id, playback_id)
            .await?;
        info!(chapter_id = %chapter.id, asset_id, "Video asset stored");
        Ok(data)
    }
}
