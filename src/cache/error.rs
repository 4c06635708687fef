use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache spawns its fetches and needs a Tokio runtime to do so.
    #[error("RecordCache must be created inside a Tokio runtime")]
    NoRuntime,
}
