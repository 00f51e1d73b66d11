use std::path::Path;
use std::sync::Arc;

use nn_core::{Error, RecordStore, Result};

pub mod backends;

pub use backends::{MemoryStore, SqliteStore};

/// Open a record store by backend name. `db_path` is only used by the
/// sqlite backend.
pub async fn create_store(backend: &str, db_path: &Path) -> Result<Arc<dyn RecordStore>> {
    match backend {
        "sqlite" => Ok(Arc::new(SqliteStore::open(db_path).await?)),
        "memory" => Ok(Arc::new(MemoryStore::new())),
        other => Err(Error::Configuration(format!(
            "unknown storage backend: {}",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::{MemoryStore, SqliteStore};
    pub use nn_core::RecordStore;
}
