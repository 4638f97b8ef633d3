use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{self, Role, User};

const USER_COLUMNS: &str = "id, first_name, last_name, department, function, phone, email, \
     role, password_hash, is_active, created_at";

/// Everything needed to store a user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub function: String,
    pub phone: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

pub async fn insert_user(db: &SqlitePool, record: NewUserRecord) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = models::now();

    sqlx::query(
        r#"
        INSERT INTO users
            (id, first_name, last_name, department, function, phone, email,
            role, password_hash, is_active, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10)
        "#,
    )
    .bind(&id)
    .bind(&record.first_name)
    .bind(&record.last_name)
    .bind(&record.department)
    .bind(&record.function)
    .bind(&record.phone)
    .bind(&record.email)
    .bind(record.role)
    .bind(&record.password_hash)
    .bind(models::db_timestamp(&now))
    .execute(db)
    .await?;

    Ok(User {
        id,
        first_name: record.first_name,
        last_name: record.last_name,
        department: record.department,
        function: record.function,
        phone: record.phone,
        email: record.email,
        role: record.role,
        password_hash: record.password_hash,
        is_active: true,
        created_at: now,
    })
}

pub async fn find_user_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(db)
        .await
}

pub async fn find_user_by_id(db: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    fn record(email: &str) -> NewUserRecord {
        NewUserRecord {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            department: "CS".to_string(),
            function: "Professor".to_string(),
            phone: "+1 555 0100".to_string(),
            email: email.to_string(),
            role: Role::Professor,
            password_hash: "$argon2id$placeholder".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let pool = connect_in_memory().await.expect("Failed to create test db");

        let user = insert_user(&pool, record("grace@example.com"))
            .await
            .expect("Failed to insert user");
        assert!(user.is_active);

        let by_email = find_user_by_email(&pool, "grace@example.com")
            .await
            .expect("Failed to query user")
            .expect("User not found");
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.role, Role::Professor);
        assert_eq!(by_email.created_at, user.created_at);

        let by_id = find_user_by_id(&pool, &user.id).await.unwrap();
        assert!(by_id.is_some());
        assert!(find_user_by_id(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_email_is_unique() {
        let pool = connect_in_memory().await.expect("Failed to create test db");

        insert_user(&pool, record("dup@example.com")).await.unwrap();
        let err = insert_user(&pool, record("dup@example.com")).await.unwrap_err();
        match err {
            sqlx::Error::Database(db_err) => assert!(db_err.is_unique_violation()),
            other => panic!("expected unique violation, got {other:?}"),
        }
    }
}
