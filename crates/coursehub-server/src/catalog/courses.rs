//! Course, category and attachment operations.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{Catalog, new_id, validate};
use crate::error::{ApiError, ApiResult};
use crate::storage::{Attachment, Category, Chapter, Course, CoursePatch, DatabaseError};

/// Fields a teacher may change on a course.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<String>,
}

/// A course with everything its teacher edits.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub chapters: Vec<Chapter>,
    pub attachments: Vec<Attachment>,
}

impl Catalog {
    /// Create an unpublished course owned by `teacher_id`.
    #[instrument(skip(self, title))]
    pub async fn create_course(&self, teacher_id: &str, title: &str) -> ApiResult<Course> {
        self.require_teacher(teacher_id)?;
        let title = validate::required("Title", title)?;

        let course = self.db.create_course(&new_id(), teacher_id, title).await?;
        info!(course_id = %course.id, "Course created");
        Ok(course)
    }

    pub async fn list_teacher_courses(&self, teacher_id: &str) -> ApiResult<Vec<Course>> {
        self.require_teacher(teacher_id)?;
        Ok(self.db.list_teacher_courses(teacher_id).await?)
    }

    pub async fn course_detail(&self, teacher_id: &str, course_id: &str) -> ApiResult<CourseDetail> {
        let course = self.owned_course(teacher_id, course_id).await?;
        let chapters = self.db.list_chapters(&course.id).await?;
        let attachments = self.db.list_attachments(&course.id).await?;
        Ok(CourseDetail {
            course,
            chapters,
            attachments,
        })
    }

    /// Partially update a course the teacher owns.
    #[instrument(skip(self, update))]
    pub async fn update_course(
        &self,
        teacher_id: &str,
        course_id: &str,
        update: &CourseUpdate,
    ) -> ApiResult<Course> {
        let course = self.owned_course(teacher_id, course_id).await?;

        let patch = CoursePatch {
            title: validate::optional("Title", update.title.as_deref())?,
            description: validate::optional("Description", update.description.as_deref())?,
            image_url: validate::optional("Image", update.image_url.as_deref())?,
            price: validate::price(update.price)?,
            category_id: validate::optional("Category", update.category_id.as_deref())?,
        };
        if patch.is_empty() {
            return Err(ApiError::validation("No fields to update"));
        }
        if let Some(category_id) = patch.category_id {
            match self.db.get_category(category_id).await {
                Ok(_) => {}
                Err(DatabaseError::NotFound(_)) => {
                    return Err(ApiError::validation("Unknown category"));
                }
                Err(e) => return Err(e.into()),
            }
        }

        let course = self.db.update_course(&course.id, &patch).await?;
        info!(course_id = %course.id, "Course updated");
        Ok(course)
    }

    /// Publish or unpublish a course.
    ///
    /// Publishing requires a title, description, image, category and at least
    /// one published chapter.
    #[instrument(skip(self))]
    pub async fn set_course_published(
        &self,
        teacher_id: &str,
        course_id: &str,
        is_published: bool,
    ) -> ApiResult<Course> {
        let course = self.owned_course(teacher_id, course_id).await?;

        if is_published {
            let complete = course.description.is_some()
                && course.image_url.is_some()
                && course.category_id.is_some();
            if !complete {
                return Err(ApiError::validation(
                    "Title, description, image and category are required to publish",
                ));
            }
            if self.db.count_published_chapters(&course.id).await? == 0 {
                return Err(ApiError::validation(
                    "At least one published chapter is required to publish",
                ));
            }
        }

        let course = self.db.set_course_published(&course.id, is_published).await?;
        info!(course_id = %course.id, is_published, "Course publish state changed");
        Ok(course)
    }

    /// Attach a file URL to a course. The name defaults to the URL's last
    /// path segment.
    #[instrument(skip(self, url))]
    pub async fn add_attachment(
        &self,
        teacher_id: &str,
        course_id: &str,
        name: Option<&str>,
        url: &str,
    ) -> ApiResult<Attachment> {
        let course = self.owned_course(teacher_id, course_id).await?;
        let url = validate::required("Url", url)?;
        let name = validate::attachment_name(name, url)?;

        let attachment = self
            .db
            .create_attachment(&new_id(), &course.id, name, url)
            .await?;
        info!(course_id = %course.id, attachment_id = %attachment.id, "Attachment added");
        Ok(attachment)
    }

    #[instrument(skip(self))]
    pub async fn create_category(&self, teacher_id: &str, name: &str) -> ApiResult<Category> {
        self.require_teacher(teacher_id)?;
        let name = validate::required("Name", name)?;

        match self.db.create_category(&new_id(), name).await {
            Ok(category) => Ok(category),
            Err(DatabaseError::Conflict(_)) => {
                Err(ApiError::validation(format!("Category {name} already exists")))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        Ok(self.db.list_categories().await?)
    }
}
