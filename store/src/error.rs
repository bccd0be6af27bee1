use civica_types::ReportId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("report {0} not found")]
    NotFound(ReportId),

    #[error("storage backend error: {0}")]
    Backend(String),
}
