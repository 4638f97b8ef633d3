use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::{self, CourseMaterial, NewMaterial};
use crate::policy::MaterialScope;

pub async fn insert_material(
    db: &SqlitePool,
    course_id: &str,
    material: NewMaterial,
    file_path: Option<String>,
) -> Result<CourseMaterial, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = models::now();

    sqlx::query(
        r#"
        INSERT INTO course_materials
            (id, course_id, title, description, material_type, file_path,
            external_link, department, is_public, uploaded_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&id)
    .bind(course_id)
    .bind(&material.title)
    .bind(&material.description)
    .bind(material.material_type)
    .bind(&file_path)
    .bind(&material.external_link)
    .bind(&material.department)
    .bind(material.is_public)
    .bind(models::db_timestamp(&now))
    .execute(db)
    .await?;

    Ok(CourseMaterial {
        id,
        course_id: course_id.to_string(),
        title: material.title,
        description: material.description,
        material_type: material.material_type,
        file_path,
        external_link: material.external_link,
        department: material.department,
        is_public: material.is_public,
        uploaded_at: now,
    })
}

/// Materials visible under `scope`, limited to one course when `course_id` is set.
pub async fn fetch_materials(
    db: &SqlitePool,
    course_id: Option<&str>,
    scope: &MaterialScope,
) -> Result<Vec<CourseMaterial>, sqlx::Error> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT m.id, m.course_id, m.title, m.description, m.material_type, m.file_path,
            m.external_link, m.department, m.is_public, m.uploaded_at
        FROM course_materials m
        JOIN courses c ON c.id = m.course_id
        WHERE 1 = 1
        "#,
    );

    if let Some(course_id) = course_id {
        query.push(" AND m.course_id = ").push_bind(course_id.to_string());
    }

    match scope {
        MaterialScope::All => {}
        MaterialScope::PublicOrDepartment(department) => {
            query
                .push(" AND (m.is_public = 1 OR m.department = ")
                .push_bind(department.clone())
                .push(")");
        }
        MaterialScope::InstructedBy(user_id) => {
            query.push(" AND c.instructor_id = ").push_bind(user_id.clone());
        }
    }

    query.push(" ORDER BY m.uploaded_at, m.id");

    query.build_query_as::<CourseMaterial>().fetch_all(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::db::courses::insert_course;
    use crate::db::users::{NewUserRecord, insert_user};
    use crate::models::{DeliveryMode, MaterialType, NewCourse, Role};

    async fn course_for(pool: &SqlitePool, email: &str) -> (String, String) {
        let user = insert_user(
            pool,
            NewUserRecord {
                first_name: "P".to_string(),
                last_name: "Prof".to_string(),
                department: "CS".to_string(),
                function: "Professor".to_string(),
                phone: String::new(),
                email: email.to_string(),
                role: Role::Professor,
                password_hash: "hash".to_string(),
            },
        )
        .await
        .unwrap();
        let now = models::now();
        let course = insert_course(
            pool,
            NewCourse {
                title: "Networks".to_string(),
                description: "desc".to_string(),
                delivery_mode: DeliveryMode::InPerson,
                start_at: now,
                end_at: now,
                meeting_link: None,
            },
            &user.id,
            None,
        )
        .await
        .unwrap();
        (user.id, course.id)
    }

    fn material(title: &str, is_public: bool, department: Option<&str>) -> NewMaterial {
        NewMaterial {
            title: title.to_string(),
            description: None,
            material_type: MaterialType::Document,
            external_link: None,
            department: department.map(str::to_string),
            is_public,
        }
    }

    fn titles(materials: &[CourseMaterial]) -> Vec<&str> {
        let mut titles: Vec<&str> = materials.iter().map(|m| m.title.as_str()).collect();
        titles.sort_unstable();
        titles
    }

    #[tokio::test]
    async fn test_scoped_listing() {
        let pool = connect_in_memory().await.expect("Failed to create test db");
        let (p1, c1) = course_for(&pool, "p1@example.com").await;
        let (_p2, c2) = course_for(&pool, "p2@example.com").await;

        for (title, public, dept) in [
            ("public", true, None),
            ("cs-private", false, Some("CS")),
            ("math-private", false, Some("Math")),
            ("nobody", false, None),
        ] {
            insert_material(&pool, &c1, material(title, public, dept), None).await.unwrap();
        }
        insert_material(&pool, &c2, material("other-course", true, None), None).await.unwrap();

        let all = fetch_materials(&pool, Some(&c1), &MaterialScope::All).await.unwrap();
        assert_eq!(all.len(), 4);

        let student = MaterialScope::PublicOrDepartment("CS".to_string());
        let visible = fetch_materials(&pool, Some(&c1), &student).await.unwrap();
        assert_eq!(titles(&visible), ["cs-private", "public"]);

        let dashboard = fetch_materials(&pool, None, &student).await.unwrap();
        assert_eq!(titles(&dashboard), ["cs-private", "other-course", "public"]);

        let own = fetch_materials(&pool, None, &MaterialScope::InstructedBy(p1)).await.unwrap();
        assert_eq!(own.len(), 4);
        assert!(own.iter().all(|m| m.course_id == c1));
    }

    #[tokio::test]
    async fn test_empty_listing_is_not_an_error() {
        let pool = connect_in_memory().await.expect("Failed to create test db");
        let (_p, c) = course_for(&pool, "p@example.com").await;
        let materials = fetch_materials(&pool, Some(&c), &MaterialScope::All).await.unwrap();
        assert!(materials.is_empty());
    }

    #[tokio::test]
    async fn test_material_requires_existing_course() {
        let pool = connect_in_memory().await.expect("Failed to create test db");
        let result = insert_material(&pool, "missing", material("x", true, None), None).await;
        assert!(result.is_err());
    }
}
