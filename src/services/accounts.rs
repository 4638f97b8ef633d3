use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::TokenService;
use crate::auth::password::{dummy_hash, hash_password_blocking, verify_password_blocking};
use crate::db::users::{self, NewUserRecord};
use crate::error::AppError;
use crate::models::{LoginRequest, RegisterRequest, TokenResponse, User};

pub struct AccountService {
    db: SqlitePool,
    tokens: Arc<TokenService>,
}

impl AccountService {
    pub fn new(db: SqlitePool, tokens: Arc<TokenService>) -> Self {
        Self { db, tokens }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        let email = normalize_email(&req.email);
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation("a valid email is required".to_string()));
        }
        if req.password.is_empty() {
            return Err(AppError::Validation("password must not be empty".to_string()));
        }
        if req.password != req.confirm_password {
            return Err(AppError::PasswordMismatch);
        }
        if users::find_user_by_email(&self.db, &email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = hash_password_blocking(req.password).await?;
        let record = NewUserRecord {
            first_name: req.first_name,
            last_name: req.last_name,
            department: req.department,
            function: req.function,
            phone: req.phone,
            email,
            role: req.role.unwrap_or_default(),
            password_hash,
        };

        // A concurrent registration can still win between the lookup and the
        // insert; the unique index decides.
        let user = users::insert_user(&self.db, record).await.map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::DuplicateEmail
            }
            other => AppError::Database(other),
        })?;

        info!("registered user {} as {}", user.id, user.role);
        Ok(user)
    }

    /// Unknown email, wrong password and deactivated accounts all fail the
    /// same way.
    pub async fn login(&self, req: LoginRequest) -> Result<TokenResponse, AppError> {
        let email = normalize_email(&req.email);
        let Some(user) = users::find_user_by_email(&self.db, &email).await? else {
            verify_password_blocking(req.password, dummy_hash().to_string()).await;
            warn!("login failed for unknown account");
            return Err(AppError::InvalidCredentials);
        };

        let verified = verify_password_blocking(req.password, user.password_hash.clone()).await;
        if !verified || !user.is_active {
            warn!("login failed for user {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        info!("issued access token for user {}", user.id);
        Ok(TokenResponse::bearer(token))
    }

    /// Resolve a bearer token to the user it was issued for.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let claims = self.tokens.validate(token)?;
        match users::find_user_by_id(&self.db, &claims.sub).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AppError::InvalidToken),
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
