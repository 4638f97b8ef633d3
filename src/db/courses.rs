use chrono::{DateTime, Duration, SubsecRound, Timelike, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::{self, Course, CourseStatus, NewCourse};

const COURSE_COLUMNS: &str = "id, title, description, delivery_mode, start_at, end_at, \
     meeting_link, image_path, status, instructor_id, created_at, updated_at";

pub async fn insert_course(
    db: &SqlitePool,
    course: NewCourse,
    instructor_id: &str,
    image_path: Option<String>,
) -> Result<Course, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = models::now();
    let status = CourseStatus::Pending;

    sqlx::query(
        r#"
        INSERT INTO courses
            (id, title, description, delivery_mode, start_at, end_at,
            meeting_link, image_path, status, instructor_id, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
        "#,
    )
    .bind(&id)
    .bind(&course.title)
    .bind(&course.description)
    .bind(course.delivery_mode)
    .bind(models::db_timestamp(&course.start_at))
    .bind(models::db_timestamp(&course.end_at))
    .bind(&course.meeting_link)
    .bind(&image_path)
    .bind(status)
    .bind(instructor_id)
    .bind(models::db_timestamp(&now))
    .execute(db)
    .await?;

    Ok(Course {
        id,
        title: course.title,
        description: course.description,
        delivery_mode: course.delivery_mode,
        start_at: course.start_at,
        end_at: course.end_at,
        meeting_link: course.meeting_link,
        image_path,
        status,
        instructor_id: instructor_id.to_string(),
        created_at: now,
        updated_at: now,
    })
}

pub async fn find_course_by_id(db: &SqlitePool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn fetch_courses(
    db: &SqlitePool,
    status: Option<CourseStatus>,
    skip: i64,
    limit: i64,
) -> Result<Vec<Course>, sqlx::Error> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COURSE_COLUMNS} FROM courses"));
    if let Some(status) = status {
        query.push(" WHERE status = ").push_bind(status);
    }
    query
        .push(" ORDER BY start_at, id LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(skip);

    query.build_query_as::<Course>().fetch_all(db).await
}

/// Approved courses, optionally bounded by `start_at >= from` and `end_at <= to`.
pub async fn fetch_calendar(
    db: &SqlitePool,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<Vec<Course>, sqlx::Error> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COURSE_COLUMNS} FROM courses WHERE status = "));
    query.push_bind(CourseStatus::Approved);
    if let Some(from) = from {
        // Stored times have whole seconds; a fractional lower bound rounds up.
        let from = if from.nanosecond() > 0 {
            from.trunc_subsecs(0) + Duration::seconds(1)
        } else {
            from
        };
        query.push(" AND start_at >= ").push_bind(models::db_timestamp(&from));
    }
    if let Some(to) = to {
        query.push(" AND end_at <= ").push_bind(models::db_timestamp(&to));
    }
    query.push(" ORDER BY start_at, id");

    query.build_query_as::<Course>().fetch_all(db).await
}

pub async fn update_course_status(
    db: &SqlitePool,
    id: &str,
    status: CourseStatus,
) -> Result<Option<Course>, sqlx::Error> {
    let now = models::now();
    let affected = sqlx::query(
        r#"
        UPDATE courses
        SET status = ?1,
            updated_at = ?2
        WHERE id = ?3
        "#,
    )
    .bind(status)
    .bind(models::db_timestamp(&now))
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    if affected == 0 {
        return Ok(None);
    }
    find_course_by_id(db, id).await
}
