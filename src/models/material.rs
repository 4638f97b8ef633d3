use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum MaterialType {
    Video,
    Pdf,
    Document,
    Link,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseMaterial {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub material_type: MaterialType,
    pub file_path: Option<String>,
    pub external_link: Option<String>,
    /// `None` makes the material visible to every department.
    pub department: Option<String>,
    pub is_public: bool,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub title: String,
    pub description: Option<String>,
    pub material_type: MaterialType,
    pub external_link: Option<String>,
    pub department: Option<String>,
    pub is_public: bool,
}

impl NewMaterial {
    pub fn validate(&self, has_file: bool) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        if self.material_type == MaterialType::Video && !has_file && self.external_link.is_none() {
            return Err(AppError::Validation(
                "external link is required for video materials without a file".to_string(),
            ));
        }
        Ok(())
    }
}
