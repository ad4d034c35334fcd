pub mod config;
pub mod error;
pub mod ingestion;
pub mod repository;
pub mod timeline;

pub use config::Settings;
pub use error::{CoreError, Result};
pub use ingestion::{
    prepare_import, read_upload, run_import, FileUpload, ImportReport, LoadedUpload, PreparedImport,
};
pub use repository::{
    CaseRepository, MemoryCaseRepository, PostgresCaseRepository, RepositoryError, StoredCase,
};
pub use timeline::{NewTimelineEvent, StageType, TimelineEvent};
