pub mod forms;

use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query};
use axum::routing::{patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::models::{
    Course, CourseMaterial, CourseStatus, LoginRequest, NewCourse, NewMaterial, RegisterRequest,
    TokenResponse, UpdateCourseStatusRequest, User,
};
use crate::services::{AccountService, CourseService, MAX_PAGE_SIZE, MaterialService};
use crate::state::AppState;

use self::forms::read_form;

#[derive(Deserialize)]
struct CourseQueryParams {
    status: Option<CourseStatus>,
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    MAX_PAGE_SIZE
}

#[derive(Deserialize)]
struct CalendarQueryParams {
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct Welcome {
    message: &'static str,
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/register", post(register))
        .route("/token", post(login))
        .route("/users/me", get(read_me))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", get(get_course))
        .route("/courses/{id}/status", patch(update_course_status))
        .route("/calendar", get(calendar))
        .route(
            "/courses/{id}/materials",
            get(list_course_materials).post(upload_material),
        )
        .route("/dashboard/materials", get(dashboard_materials))
        .layer(ServiceBuilder::new().layer(DefaultBodyLimit::max(body_limit)))
        .with_state(state)
}

fn accounts(state: &AppState) -> AccountService {
    AccountService::new(state.db.clone(), state.tokens.clone())
}

fn courses(state: &AppState) -> CourseService {
    CourseService::new(state.db.clone(), state.storage.clone())
}

fn materials(state: &AppState) -> MaterialService {
    MaterialService::new(state.db.clone(), state.storage.clone())
}

async fn root() -> Json<Welcome> {
    Json(Welcome {
        message: "Welcome to the learnhub e-learning API",
    })
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<User>, AppError> {
    let user = accounts(&state).register(req).await?;
    Ok(Json(user))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = accounts(&state).login(req).await?;
    Ok(Json(token))
}

async fn read_me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

async fn create_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<Json<Course>, AppError> {
    let mut form = read_form(multipart, "image").await?;
    let course = NewCourse {
        title: form.required("title")?,
        description: form.required("description")?,
        delivery_mode: form.required_enum("delivery_mode")?,
        start_at: form.required_datetime("start_at")?,
        end_at: form.required_datetime("end_at")?,
        meeting_link: form.optional("meeting_link"),
    };
    let image = form.file.take();

    let course = courses(&state).create(&user, course, image).await?;
    Ok(Json(course))
}

async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<CourseQueryParams>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = courses(&state)
        .list(params.status, params.skip, params.limit)
        .await?;
    Ok(Json(courses))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    let course = courses(&state).get(&id).await?;
    Ok(Json(course))
}

async fn update_course_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseStatusRequest>,
) -> Result<Json<Course>, AppError> {
    let course = courses(&state)
        .update_status(&user, &id, req.status)
        .await?;
    Ok(Json(course))
}

async fn calendar(
    State(state): State<AppState>,
    Query(params): Query<CalendarQueryParams>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = courses(&state)
        .calendar(params.start_date, params.end_date)
        .await?;
    Ok(Json(courses))
}

async fn upload_material(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<CourseMaterial>, AppError> {
    let mut form = read_form(multipart, "file").await?;
    let material = NewMaterial {
        title: form.required("title")?,
        description: form.optional("description"),
        material_type: form.required_enum("material_type")?,
        external_link: form.optional("external_link"),
        department: form.optional("department"),
        is_public: form.bool_or("is_public", true)?,
    };
    let file = form.file.take();

    let material = materials(&state)
        .upload(&user, &course_id, material, file)
        .await?;
    Ok(Json(material))
}

async fn list_course_materials(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<CourseMaterial>>, AppError> {
    let materials = materials(&state).list_for_course(&user, &course_id).await?;
    Ok(Json(materials))
}

async fn dashboard_materials(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<CourseMaterial>>, AppError> {
    let materials = materials(&state).dashboard(&user).await?;
    Ok(Json(materials))
}
