use std::sync::Arc;
use async_trait::async_trait;
use brief_core::{Result, Storage};
use tracing::info;

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn get_error_message() -> &'static str;

    /// Open the backend, optionally at a backend specific location
    async fn open(url: Option<&str>) -> Result<Self> where Self: Sized;
}

/// Open the storage named by `kind` (`memory` or `sqlite`).
pub async fn create_storage(kind: &str, url: Option<&str>) -> Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match kind.trim().to_lowercase().as_str() {
        "memory" => Arc::new(MemoryStorage::open(url).await?),
        #[cfg(feature = "sqlite")]
        "sqlite" => Arc::new(SQLiteStorage::open(url).await?),
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => {
            return Err(brief_core::Error::Storage(
                "sqlite storage requires the `sqlite` feature".to_string(),
            ))
        }
        other => {
            return Err(brief_core::Error::Storage(format!(
                "Unknown storage backend: {}. Available: memory, sqlite",
                other
            )))
        }
    };
    info!("🏦 Storage backend ready ({})", kind);
    Ok(storage)
}

pub mod prelude {
    pub use super::{create_storage, StorageBackend};
    pub use super::backends::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_storage() {
        assert!(create_storage("memory", None).await.is_ok());
        assert!(create_storage("Memory ", None).await.is_ok());
        assert!(create_storage("qdrant", None).await.is_err());
    }
}
