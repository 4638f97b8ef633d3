use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum DeliveryMode {
    InPerson,
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CourseStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub delivery_mode: DeliveryMode,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub meeting_link: Option<String>,
    pub image_path: Option<String>,
    pub status: CourseStatus,
    pub instructor_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A course as submitted by its instructor, before it is stored.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub delivery_mode: DeliveryMode,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub meeting_link: Option<String>,
}

impl NewCourse {
    /// Online courses carry a meeting link, in-person ones never do.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        if self.end_at < self.start_at {
            return Err(AppError::Validation(
                "end_at must not be before start_at".to_string(),
            ));
        }
        match (self.delivery_mode, self.meeting_link.as_deref()) {
            (DeliveryMode::Online, None) => Err(AppError::Validation(
                "meeting link is required for online courses".to_string(),
            )),
            (DeliveryMode::InPerson, Some(_)) => Err(AppError::Validation(
                "meeting link is only allowed for online courses".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCourseStatusRequest {
    pub status: CourseStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft(mode: DeliveryMode, link: Option<&str>) -> NewCourse {
        NewCourse {
            title: "Rust for engineers".to_string(),
            description: "ownership and borrowing".to_string(),
            delivery_mode: mode,
            start_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            end_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            meeting_link: link.map(str::to_string),
        }
    }

    #[test]
    fn online_course_requires_meeting_link() {
        let err = draft(DeliveryMode::Online, None).validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(draft(DeliveryMode::Online, Some("https://meet.example/abc")).validate().is_ok());
    }

    #[test]
    fn in_person_course_rejects_meeting_link() {
        assert!(draft(DeliveryMode::InPerson, None).validate().is_ok());
        assert!(draft(DeliveryMode::InPerson, Some("https://meet.example/abc")).validate().is_err());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut course = draft(DeliveryMode::InPerson, None);
        course.end_at = Utc.with_ymd_and_hms(2026, 2, 28, 9, 0, 0).unwrap();
        assert!(matches!(course.validate(), Err(AppError::Validation(_))));
    }
}
