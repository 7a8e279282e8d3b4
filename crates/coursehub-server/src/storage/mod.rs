//! SQLite storage for the CourseHub server.
//!
//! Provides persistence for categories, courses, chapters, attachments,
//! video asset ids, purchases and per-user progress.

mod db;
mod models;
mod queries;
mod queries_chapters;

#[cfg(test)]
mod tests;

pub use db::{CourseDatabase, DatabaseError};
pub use models::*;
pub use queries::CoursePatch;
pub use queries_chapters::ChapterPatch;
