//! Course authoring and enrollment operations.
//!
//! Every teacher operation checks the allow-list first and is scoped to
//! courses owned by the caller. Student operations record purchases and
//! progress.

mod chapters;
mod courses;
mod students;
mod validate;


use std::sync::Arc;

use tracing::warn;

use crate::access::TeacherAllowList;
use crate::error::{ApiError, ApiResult};
use crate::storage::{Course, CourseDatabase};

pub use chapters::{ChapterPosition, ChapterUpdate};
pub use courses::{CourseDetail, CourseUpdate};

#[derive(Clone)]
pub struct Catalog {
    db: CourseDatabase,
    teachers: Arc<TeacherAllowList>,
}

impl Catalog {
    pub const fn new(db: CourseDatabase, teachers: Arc<TeacherAllowList>) -> Self {
        Self { db, teachers }
    }

    pub const fn db(&self) -> &CourseDatabase {
        &self.db
    }

    pub fn is_teacher(&self, identity: &str) -> bool {
        self.teachers.is_teacher(identity)
    }

    fn require_teacher(&self, identity: &str) -> ApiResult<()> {
        if self.is_teacher(identity) {
            Ok(())
        } else {
            warn!(user_id = %identity, "Rejected teacher-only operation");
            Err(ApiError::Authorization)
        }
    }

    /// Resolve a course the teacher owns. Unknown and foreign courses are
    /// both reported as not found.
    async fn owned_course(&self, teacher_id: &str, course_id: &str) -> ApiResult<Course> {
        self.require_teacher(teacher_id)?;
        Ok(self.db.get_owned_course(course_id, teacher_id).await?)
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
