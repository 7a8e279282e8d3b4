//! SQLite database for the CourseHub server.

pub use coursehub_core::db::DatabaseError;

coursehub_core::define_database!(CourseDatabase, "Course database migrations complete");
