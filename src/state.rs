use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::TokenService;
use crate::storage::FileStorage;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tokens: Arc<TokenService>,
    pub storage: Arc<dyn FileStorage>,
    pub max_upload_bytes: usize,
}
