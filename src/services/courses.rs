use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::courses;
use crate::error::AppError;
use crate::models::{Course, CourseStatus, NewCourse, User};
use crate::policy::{self, Action};
use crate::storage::{FileStorage, UploadedFile};

pub const MAX_PAGE_SIZE: i64 = 100;
const COURSE_IMAGE_SCOPE: &str = "course_images";

pub struct CourseService {
    db: SqlitePool,
    storage: Arc<dyn FileStorage>,
}

impl CourseService {
    pub fn new(db: SqlitePool, storage: Arc<dyn FileStorage>) -> Self {
        Self { db, storage }
    }

    pub async fn create(
        &self,
        actor: &User,
        course: NewCourse,
        image: Option<UploadedFile>,
    ) -> Result<Course, AppError> {
        policy::authorize(actor, Action::CreateCourse)?;
        course.validate()?;

        let image_path = match image {
            Some(file) => Some(self.storage.store(&file, COURSE_IMAGE_SCOPE).await?),
            None => None,
        };

        let course =
            match courses::insert_course(&self.db, course, &actor.id, image_path.clone()).await {
                Ok(course) => course,
                Err(e) => {
                    super::discard_upload(self.storage.as_ref(), image_path.as_deref()).await;
                    return Err(e.into());
                }
            };
        info!("user {} created course {} ({})", actor.id, course.id, course.title);
        Ok(course)
    }

    pub async fn list(
        &self,
        status: Option<CourseStatus>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Course>, AppError> {
        let skip = skip.max(0);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        Ok(courses::fetch_courses(&self.db, status, skip, limit).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Course, AppError> {
        courses::find_course_by_id(&self.db, id)
            .await?
            .ok_or(AppError::NotFound("Course"))
    }

    pub async fn update_status(
        &self,
        actor: &User,
        id: &str,
        status: CourseStatus,
    ) -> Result<Course, AppError> {
        policy::authorize(actor, Action::UpdateCourseStatus)?;
        let course = courses::update_course_status(&self.db, id, status)
            .await?
            .ok_or(AppError::NotFound("Course"))?;
        info!("user {} set course {} to {:?}", actor.id, course.id, course.status);
        Ok(course)
    }

    pub async fn calendar(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Course>, AppError> {
        Ok(courses::fetch_calendar(&self.db, from, to).await?)
    }
}
