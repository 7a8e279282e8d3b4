//! Access control for CourseHub.
//!
//! Provides the teacher allow-list, session token verification and the
//! request identity extractor.

pub mod identity;
pub mod session;
pub mod teachers;

pub use identity::Identity;
pub use session::{SessionClaims, SessionVerifier};
pub use teachers::TeacherAllowList;
