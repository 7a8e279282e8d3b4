//! `CourseHub` Core Library
//!
//! Shared functionality for `CourseHub` components:
//! - Configuration resolution and hierarchy
//! - `SQLite` pool helpers and database errors
//! - Tracing initialization
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
