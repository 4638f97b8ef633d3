use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::{courses, materials};
use crate::error::AppError;
use crate::models::{Course, CourseMaterial, NewMaterial, User};
use crate::policy::{self, Action};
use crate::storage::{FileStorage, UploadedFile};

pub struct MaterialService {
    db: SqlitePool,
    storage: Arc<dyn FileStorage>,
}

impl MaterialService {
    pub fn new(db: SqlitePool, storage: Arc<dyn FileStorage>) -> Self {
        Self { db, storage }
    }

    async fn course(&self, course_id: &str) -> Result<Course, AppError> {
        courses::find_course_by_id(&self.db, course_id)
            .await?
            .ok_or(AppError::NotFound("Course"))
    }

    pub async fn upload(
        &self,
        actor: &User,
        course_id: &str,
        material: NewMaterial,
        file: Option<UploadedFile>,
    ) -> Result<CourseMaterial, AppError> {
        let course = self.course(course_id).await?;
        if let Err(e) = policy::authorize(actor, Action::UploadMaterial { course: &course }) {
            warn!("user {} denied upload to course {}", actor.id, course.id);
            return Err(e);
        }
        material.validate(file.is_some())?;

        let file_path = match file {
            Some(file) => Some(
                self.storage
                    .store(&file, &format!("courses/{}", course.id))
                    .await?,
            ),
            None => None,
        };

        let material =
            match materials::insert_material(&self.db, &course.id, material, file_path.clone()).await
            {
                Ok(material) => material,
                Err(e) => {
                    super::discard_upload(self.storage.as_ref(), file_path.as_deref()).await;
                    return Err(e.into());
                }
            };
        info!("user {} uploaded material {} to course {}", actor.id, material.id, course.id);
        Ok(material)
    }

    pub async fn list_for_course(
        &self,
        actor: &User,
        course_id: &str,
    ) -> Result<Vec<CourseMaterial>, AppError> {
        let course = self.course(course_id).await?;
        let scope = policy::course_material_scope(actor, &course)?;
        Ok(materials::fetch_materials(&self.db, Some(&course.id), &scope).await?)
    }

    pub async fn dashboard(&self, actor: &User) -> Result<Vec<CourseMaterial>, AppError> {
        let scope = policy::dashboard_scope(actor);
        Ok(materials::fetch_materials(&self.db, None, &scope).await?)
    }
}
