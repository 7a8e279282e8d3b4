//! `CourseHub` Server Library
//!
//! Core functionality for the `CourseHub` API:
//! - `SQLite` storage for courses, chapters, purchases and progress
//! - Session verification and the teacher allow-list
//! - Course authoring and enrollment operations
//! - Chapter access decisions and course outlines
//! - HTTP routes

pub mod access;
pub mod catalog;
pub mod error;
pub mod routes;
pub mod storage;
pub mod view;
