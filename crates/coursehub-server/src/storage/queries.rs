//! Course, category, attachment and purchase queries for the CourseHub server.

use coursehub_core::db::unix_timestamp;

use super::db::{CourseDatabase, DatabaseError};
use super::models::{Attachment, Category, Course, Purchase};

/// Partial update of a course. `None` leaves the column unchanged.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CoursePatch<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub price: Option<f64>,
    pub category_id: Option<&'a str>,
}

impl CoursePatch<'_> {
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
            && self.price.is_none()
            && self.category_id.is_none()
    }
}

impl CourseDatabase {
    // =========================================================================
    // Category queries
    // =========================================================================

    /// Create a category.
    pub async fn create_category(&self, id: &str, name: &str) -> Result<Category, DatabaseError> {
        sqlx::query("INSERT INTO categories (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(self.pool())
            .await?;

        self.get_category(id).await
    }

    /// Get a category by ID.
    pub async fn get_category(&self, id: &str) -> Result<Category, DatabaseError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Category {id}")))
    }

    /// List all categories by name.
    pub async fn list_categories(&self) -> Result<Vec<Category>, DatabaseError> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(self.pool())
            .await?;

        Ok(categories)
    }

    // =========================================================================
    // Course queries
    // =========================================================================

    /// Create an unpublished course owned by `user_id`.
    pub async fn create_course(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
    ) -> Result<Course, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO courses (id, user_id, title, is_published, created_at, updated_at) VALUES (?, ?, ?, 0, ?, ?)",
        )
        .bind(id)
        .bind(user_id)
        .bind(title)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_course(id).await
    }

    /// Get a course by ID.
    pub async fn get_course(&self, id: &str) -> Result<Course, DatabaseError> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Course {id}")))
    }

    /// Get a course only if it is owned by `user_id`.
    pub async fn get_owned_course(&self, id: &str, user_id: &str) -> Result<Course, DatabaseError> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Course {id}")))
    }

    /// Get a published course by ID.
    pub async fn get_published_course(&self, id: &str) -> Result<Option<Course>, DatabaseError> {
        let course =
            sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = ? AND is_published = 1")
                .bind(id)
                .fetch_optional(self.pool())
                .await?;

        Ok(course)
    }

    /// List courses owned by a teacher, newest first.
    pub async fn list_teacher_courses(&self, user_id: &str) -> Result<Vec<Course>, DatabaseError> {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT * FROM courses WHERE user_id = ? ORDER BY created_at DESC, id ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(courses)
    }

    /// Apply a partial update to a course.
    pub async fn update_course(
        &self,
        id: &str,
        patch: &CoursePatch<'_>,
    ) -> Result<Course, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "UPDATE courses SET \
                title = COALESCE(?, title), \
                description = COALESCE(?, description), \
                image_url = COALESCE(?, image_url), \
                price = COALESCE(?, price), \
                category_id = COALESCE(?, category_id), \
                updated_at = ? \
             WHERE id = ?",
        )
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.image_url)
        .bind(patch.price)
        .bind(patch.category_id)
        .bind(now)
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Course {id}")));
        }

        self.get_course(id).await
    }

    /// Set the published flag of a course.
    pub async fn set_course_published(
        &self,
        id: &str,
        is_published: bool,
    ) -> Result<Course, DatabaseError> {
        let now = unix_timestamp();

        let result =
            sqlx::query("UPDATE courses SET is_published = ?, updated_at = ? WHERE id = ?")
                .bind(is_published)
                .bind(now)
                .bind(id)
                .execute(self.pool())
                .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Course {id}")));
        }

        self.get_course(id).await
    }

    // =========================================================================
    // Attachment queries
    // =========================================================================

    /// Attach a file URL to a course.
    pub async fn create_attachment(
        &self,
        id: &str,
        course_id: &str,
        name: &str,
        url: &str,
    ) -> Result<Attachment, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO attachments (id, name, url, course_id, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(url)
        .bind(course_id)
        .bind(now)
        .execute(self.pool())
        .await?;

        let attachment = sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = ?")
            .bind(id)
            .fetch_one(self.pool())
            .await?;

        Ok(attachment)
    }

    /// List attachments of a course, oldest first.
    pub async fn list_attachments(&self, course_id: &str) -> Result<Vec<Attachment>, DatabaseError> {
        let attachments = sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE course_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(course_id)
        .fetch_all(self.pool())
        .await?;

        Ok(attachments)
    }

    // =========================================================================
    // Purchase queries
    // =========================================================================

    /// Record a purchase. Recording the same `(user, course)` pair twice
    /// returns the original row.
    pub async fn create_purchase(
        &self,
        id: &str,
        user_id: &str,
        course_id: &str,
    ) -> Result<Purchase, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO purchases (id, user_id, course_id, created_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT (user_id, course_id) DO NOTHING",
        )
        .bind(id)
        .bind(user_id)
        .bind(course_id)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_purchase(user_id, course_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Purchase {user_id}/{course_id}")))
    }

    /// Find the purchase of a course by a user.
    pub async fn get_purchase(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Purchase>, DatabaseError> {
        let purchase = sqlx::query_as::<_, Purchase>(
            "SELECT * FROM purchases WHERE user_id = ? AND course_id = ?",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(purchase)
    }
}
