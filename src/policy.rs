//! Role-based authorization.
//!
//! Every decision about what an authenticated user may do or see is made here.
//! The functions are pure: they take the acting user and the resource that was
//! already loaded, and either allow, deny with [`AppError::Forbidden`], or
//! return the [`MaterialScope`] a listing must be narrowed to.

use crate::error::AppError;
use crate::models::{Course, CourseMaterial, Role, User};

/// Actions gated by role and, where it matters, ownership of a course.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    CreateCourse,
    UpdateCourseStatus,
    UploadMaterial { course: &'a Course },
}

/// The subset of course materials a user is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialScope {
    All,
    /// Public materials plus private ones scoped to this department.
    PublicOrDepartment(String),
    /// Materials attached to courses taught by this user.
    InstructedBy(String),
}

impl MaterialScope {
    /// In-memory form of the filter the store applies in SQL.
    pub fn permits(&self, material: &CourseMaterial, course: &Course) -> bool {
        match self {
            MaterialScope::All => true,
            MaterialScope::PublicOrDepartment(department) => {
                material.is_public || material.department.as_deref() == Some(department.as_str())
            }
            MaterialScope::InstructedBy(user_id) => course.instructor_id == *user_id,
        }
    }
}

pub fn authorize(actor: &User, action: Action<'_>) -> Result<(), AppError> {
    let allowed = match (actor.role, action) {
        (Role::Professor, Action::CreateCourse) => true,
        (Role::Hr, Action::UpdateCourseStatus) => true,
        (Role::Professor, Action::UploadMaterial { course }) => course.instructor_id == actor.id,
        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden(denial_reason(action).to_string()))
    }
}

fn denial_reason(action: Action<'_>) -> &'static str {
    match action {
        Action::CreateCourse => "only professors can create courses",
        Action::UpdateCourseStatus => "only HR can update course status",
        Action::UploadMaterial { .. } => "not authorized to upload materials to this course",
    }
}

/// Scope for the materials of one course.
///
/// Students are filtered, never denied. A professor who does not teach the
/// course is denied outright rather than shown an empty list.
pub fn course_material_scope(actor: &User, course: &Course) -> Result<MaterialScope, AppError> {
    match actor.role {
        Role::Student => Ok(MaterialScope::PublicOrDepartment(actor.department.clone())),
        Role::Professor if course.instructor_id == actor.id => Ok(MaterialScope::All),
        Role::Professor => Err(AppError::Forbidden(
            "not authorized to view materials for this course".to_string(),
        )),
        Role::Hr => Ok(MaterialScope::All),
    }
}

/// Scope for the cross-course dashboard.
pub fn dashboard_scope(actor: &User) -> MaterialScope {
    match actor.role {
        Role::Student => MaterialScope::PublicOrDepartment(actor.department.clone()),
        Role::Professor => MaterialScope::InstructedBy(actor.id.clone()),
        Role::Hr => MaterialScope::All,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{self, CourseStatus, DeliveryMode, MaterialType};

    fn user(id: &str, role: Role, department: &str) -> User {
        User {
            id: id.to_string(),
            first_name: id.to_string(),
            last_name: "Test".to_string(),
            department: department.to_string(),
            function: "staff".to_string(),
            phone: String::new(),
            email: format!("{id}@example.com"),
            role,
            password_hash: String::new(),
            is_active: true,
            created_at: models::now(),
        }
    }

    fn course(instructor_id: &str) -> Course {
        let now = models::now();
        Course {
            id: "c1".to_string(),
            title: "Databases".to_string(),
            description: "relational theory".to_string(),
            delivery_mode: DeliveryMode::InPerson,
            start_at: now,
            end_at: now,
            meeting_link: None,
            image_path: None,
            status: CourseStatus::Pending,
            instructor_id: instructor_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn material(is_public: bool, department: Option<&str>) -> CourseMaterial {
        CourseMaterial {
            id: "m".to_string(),
            course_id: "c1".to_string(),
            title: "notes".to_string(),
            description: None,
            material_type: MaterialType::Pdf,
            file_path: None,
            external_link: None,
            department: department.map(str::to_string),
            is_public,
            uploaded_at: models::now(),
        }
    }

    #[test]
    fn only_professors_create_courses() {
        assert!(authorize(&user("p", Role::Professor, "CS"), Action::CreateCourse).is_ok());
        for role in [Role::Student, Role::Hr] {
            let err = authorize(&user("x", role, "CS"), Action::CreateCourse).unwrap_err();
            assert!(matches!(err, AppError::Forbidden(_)));
        }
    }

    #[test]
    fn only_hr_updates_status() {
        assert!(authorize(&user("h", Role::Hr, "HR"), Action::UpdateCourseStatus).is_ok());
        for role in [Role::Student, Role::Professor] {
            assert!(authorize(&user("x", role, "CS"), Action::UpdateCourseStatus).is_err());
        }
    }

    #[test]
    fn only_owning_professor_uploads() {
        let c = course("p1");
        let upload = Action::UploadMaterial { course: &c };
        assert!(authorize(&user("p1", Role::Professor, "CS"), upload).is_ok());
        assert!(authorize(&user("p2", Role::Professor, "CS"), upload).is_err());
        assert!(authorize(&user("h", Role::Hr, "HR"), upload).is_err());
        // A student sharing the instructor's id is still not a professor.
        assert!(authorize(&user("p1", Role::Student, "CS"), upload).is_err());
    }

    #[test]
    fn student_sees_public_or_own_department() {
        let c = course("p1");
        let scope = course_material_scope(&user("s", Role::Student, "CS"), &c).unwrap();
        assert_eq!(scope, MaterialScope::PublicOrDepartment("CS".to_string()));

        assert!(scope.permits(&material(true, None), &c));
        assert!(scope.permits(&material(true, Some("Math")), &c));
        assert!(scope.permits(&material(false, Some("CS")), &c));
        assert!(!scope.permits(&material(false, Some("Math")), &c));
        assert!(!scope.permits(&material(false, None), &c));
    }

    #[test]
    fn foreign_professor_is_denied_not_filtered() {
        let c = course("p1");
        assert_eq!(
            course_material_scope(&user("p1", Role::Professor, "CS"), &c).unwrap(),
            MaterialScope::All
        );
        let err = course_material_scope(&user("p2", Role::Professor, "CS"), &c).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn hr_sees_everything() {
        let c = course("p1");
        assert_eq!(course_material_scope(&user("h", Role::Hr, "HR"), &c).unwrap(), MaterialScope::All);
        assert_eq!(dashboard_scope(&user("h", Role::Hr, "HR")), MaterialScope::All);
    }

    #[test]
    fn professor_dashboard_is_limited_to_own_courses() {
        let scope = dashboard_scope(&user("p1", Role::Professor, "CS"));
        assert!(scope.permits(&material(false, Some("Math")), &course("p1")));
        assert!(!scope.permits(&material(true, None), &course("p2")));
    }
}
