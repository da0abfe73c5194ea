use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup file is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("backup file has no \"{0}\" section")]
    MissingKey(&'static str),
    #[error("backup section \"{key}\" is invalid: {source}")]
    InvalidRecord {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("could not reach the analysis service: {0}")]
    Unreachable(String),
    #[error("the analysis service rejected the request: {0}")]
    Unauthorized(String),
    #[error("the analysis service returned no text")]
    EmptyResponse,
}
