//! Chapter, video and progress queries for the CourseHub server.

use coursehub_core::db::unix_timestamp;
use tracing::debug;

use super::db::{CourseDatabase, DatabaseError};
use super::models::{Chapter, MuxData, UserProgress};

/// Attempts at inserting a chapter before a position conflict is reported.
const MAX_POSITION_ATTEMPTS: u32 = 5;

/// Partial update of a chapter. `None` leaves the column unchanged.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChapterPatch<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub video_url: Option<&'a str>,
    pub is_free: Option<bool>,
}

impl ChapterPatch<'_> {
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.video_url.is_none()
            && self.is_free.is_none()
    }
}

impl CourseDatabase {
    // =========================================================================
    // Chapter queries
    // =========================================================================

    /// Append a chapter to a course.
    ///
    /// The position is computed by the INSERT itself as one past the current
    /// maximum. `UNIQUE(course_id, position)` rejects a duplicate, in which
    /// case the insert is retried against the new maximum.
    pub async fn create_chapter(
        &self,
        id: &str,
        course_id: &str,
        title: &str,
    ) -> Result<Chapter, DatabaseError> {
        let mut attempt = 1;
        loop {
            let now = unix_timestamp();
            let result = sqlx::query(
                "INSERT INTO chapters (id, course_id, title, position, is_published, is_free, created_at, updated_at) \
                 SELECT ?, ?, ?, COALESCE(MAX(position), 0) + 1, 0, 0, ?, ? FROM chapters WHERE course_id = ?",
            )
            .bind(id)
            .bind(course_id)
            .bind(title)
            .bind(now)
            .bind(now)
            .bind(course_id)
            .execute(self.pool())
            .await;

            match result {
                Ok(_) => return self.get_chapter(id).await,
                Err(e) => {
                    let err = DatabaseError::from(e);
                    if !err.is_conflict() || attempt >= MAX_POSITION_ATTEMPTS {
                        return Err(err);
                    }
                    debug!(course_id, attempt, "Chapter position taken, retrying");
                    attempt += 1;
                }
            }
        }
    }

    /// Get a chapter by ID.
    pub async fn get_chapter(&self, id: &str) -> Result<Chapter, DatabaseError> {
        sqlx::query_as::<_, Chapter>("SELECT * FROM chapters WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Chapter {id}")))
    }

    /// Get a chapter only if it belongs to `course_id`.
    pub async fn get_course_chapter(
        &self,
        course_id: &str,
        chapter_id: &str,
    ) -> Result<Chapter, DatabaseError> {
        sqlx::query_as::<_, Chapter>("SELECT * FROM chapters WHERE id = ? AND course_id = ?")
            .bind(chapter_id)
            .bind(course_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Chapter {chapter_id}")))
    }

    /// List all chapters of a course in position order.
    pub async fn list_chapters(&self, course_id: &str) -> Result<Vec<Chapter>, DatabaseError> {
        let chapters = sqlx::query_as::<_, Chapter>(
            "SELECT * FROM chapters WHERE course_id = ? ORDER BY position ASC",
        )
        .bind(course_id)
        .fetch_all(self.pool())
        .await?;

        Ok(chapters)
    }

    /// List published chapters of a course in position order.
    pub async fn list_published_chapters(
        &self,
        course_id: &str,
    ) -> Result<Vec<Chapter>, DatabaseError> {
        let chapters = sqlx::query_as::<_, Chapter>(
            "SELECT * FROM chapters WHERE course_id = ? AND is_published = 1 ORDER BY position ASC",
        )
        .bind(course_id)
        .fetch_all(self.pool())
        .await?;

        Ok(chapters)
    }

    /// The published chapter with the smallest position greater than `after`.
    pub async fn next_published_chapter(
        &self,
        course_id: &str,
        after: i64,
    ) -> Result<Option<Chapter>, DatabaseError> {
        let chapter = sqlx::query_as::<_, Chapter>(
            "SELECT * FROM chapters WHERE course_id = ? AND is_published = 1 AND position > ? \
             ORDER BY position ASC LIMIT 1",
        )
        .bind(course_id)
        .bind(after)
        .fetch_optional(self.pool())
        .await?;

        Ok(chapter)
    }

    /// Count published chapters of a course.
    pub async fn count_published_chapters(&self, course_id: &str) -> Result<i64, DatabaseError> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM chapters WHERE course_id = ? AND is_published = 1",
        )
        .bind(course_id)
        .fetch_one(self.pool())
        .await?;

        Ok(row.0)
    }

    /// Apply a partial update to a chapter.
    pub async fn update_chapter(
        &self,
        id: &str,
        patch: &ChapterPatch<'_>,
    ) -> Result<Chapter, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "UPDATE chapters SET \
                title = COALESCE(?, title), \
                description = COALESCE(?, description), \
                video_url = COALESCE(?, video_url), \
                is_free = COALESCE(?, is_free), \
                updated_at = ? \
             WHERE id = ?",
        )
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.video_url)
        .bind(patch.is_free)
        .bind(now)
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Chapter {id}")));
        }

        self.get_chapter(id).await
    }

    /// Set the published flag of a chapter.
    pub async fn set_chapter_published(
        &self,
        id: &str,
        is_published: bool,
    ) -> Result<Chapter, DatabaseError> {
        let now = unix_timestamp();

        let result =
            sqlx::query("UPDATE chapters SET is_published = ?, updated_at = ? WHERE id = ?")
                .bind(is_published)
                .bind(now)
                .bind(id)
                .execute(self.pool())
                .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Chapter {id}")));
        }

        self.get_chapter(id).await
    }

    /// Assign new positions to chapters of a course in one transaction.
    ///
    /// Positions are first moved out of the way (negated) so the unique
    /// constraint holds at every step. Any chapter outside the course rolls
    /// the whole reorder back.
    pub async fn reorder_chapters(
        &self,
        course_id: &str,
        positions: &[(&str, i64)],
    ) -> Result<(), DatabaseError> {
        let now = unix_timestamp();
        let mut tx = self.pool().begin().await?;

        sqlx::query("UPDATE chapters SET position = -position WHERE course_id = ? AND position > 0")
            .bind(course_id)
            .execute(&mut *tx)
            .await?;

        for &(chapter_id, position) in positions {
            let result = sqlx::query(
                "UPDATE chapters SET position = ?, updated_at = ? WHERE id = ? AND course_id = ?",
            )
            .bind(position)
            .bind(now)
            .bind(chapter_id)
            .bind(course_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DatabaseError::NotFound(format!("Chapter {chapter_id}")));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Video queries
    // =========================================================================

    /// Store the media service ids for a chapter, replacing earlier ones.
    pub async fn upsert_mux_data(
        &self,
        id: &str,
        chapter_id: &str,
        asset_id: &str,
        playback_id: Option<&str>,
    ) -> Result<MuxData, DatabaseError> {
        sqlx::query(
            "INSERT INTO mux_data (id, chapter_id, asset_id, playback_id) VALUES (?, ?, ?, ?) \
             ON CONFLICT (chapter_id) DO UPDATE SET asset_id = excluded.asset_id, playback_id = excluded.playback_id",
        )
        .bind(id)
        .bind(chapter_id)
        .bind(asset_id)
        .bind(playback_id)
        .execute(self.pool())
        .await?;

        self.get_mux_data(chapter_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Video data for chapter {chapter_id}")))
    }

    /// Get the video ids of a chapter.
    pub async fn get_mux_data(&self, chapter_id: &str) -> Result<Option<MuxData>, DatabaseError> {
        let data = sqlx::query_as::<_, MuxData>("SELECT * FROM mux_data WHERE chapter_id = ?")
            .bind(chapter_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(data)
    }

    // =========================================================================
    // Progress queries
    // =========================================================================

    /// Insert or update the completion flag of a user on a chapter.
    pub async fn upsert_progress(
        &self,
        id: &str,
        user_id: &str,
        chapter_id: &str,
        is_completed: bool,
    ) -> Result<UserProgress, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO user_progress (id, user_id, chapter_id, is_completed, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT (user_id, chapter_id) DO UPDATE SET is_completed = excluded.is_completed, updated_at = excluded.updated_at",
        )
        .bind(id)
        .bind(user_id)
        .bind(chapter_id)
        .bind(is_completed)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_progress(user_id, chapter_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Progress {user_id}/{chapter_id}")))
    }

    /// Get the progress of a user on a chapter.
    pub async fn get_progress(
        &self,
        user_id: &str,
        chapter_id: &str,
    ) -> Result<Option<UserProgress>, DatabaseError> {
        let progress = sqlx::query_as::<_, UserProgress>(
            "SELECT * FROM user_progress WHERE user_id = ? AND chapter_id = ?",
        )
        .bind(user_id)
        .bind(chapter_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(progress)
    }

    /// IDs of the published chapters of a course the user has completed.
    pub async fn completed_chapter_ids(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Vec<String>, DatabaseError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT p.chapter_id FROM user_progress p \
             JOIN chapters c ON c.id = p.chapter_id \
             WHERE p.user_id = ? AND c.course_id = ? AND c.is_published = 1 AND p.is_completed = 1 \
             ORDER BY c.position ASC",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
