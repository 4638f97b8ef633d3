pub mod accounts;
pub mod courses;
pub mod materials;

pub use accounts::AccountService;
pub use courses::{CourseService, MAX_PAGE_SIZE};
pub use materials::MaterialService;

use tracing::warn;

use crate::storage::FileStorage;

/// Drop a stored upload whose database row was never written.
async fn discard_upload(storage: &dyn FileStorage, reference: Option<&str>) {
    let Some(reference) = reference else {
        return;
    };
    match storage.remove(reference).await {
        Ok(()) => warn!("discarded upload {} after failed insert", reference),
        Err(e) => warn!("failed to discard orphaned upload {}: {}", reference, e),
    }
}
