pub mod course;
pub mod material;
pub mod user;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

pub use course::{Course, CourseStatus, DeliveryMode, NewCourse, UpdateCourseStatusRequest};
pub use material::{CourseMaterial, MaterialType, NewMaterial};
pub use user::{LoginRequest, RegisterRequest, Role, TokenResponse, User};

/// Timestamps are stored as fixed-width RFC 3339 strings so that SQL range
/// comparisons on the text columns order the same way as the instants.
pub fn db_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
