pub mod models;
pub mod error;
pub mod storage;
pub mod types;

pub use error::{Error, ProviderError, Result};
pub use models::InferenceModel;
pub use storage::{ArticleStorage, BriefStorage, Storage};
pub use types::{
    Article, Brief, Development, FallbackReason, HistoricalBrief, ReconciliationGap, Resolution,
    SourceReference,
};
