use thiserror::Error;

/// Top-level failure modes of a pipeline run (§4.1 "fatal conditions").
///
/// Every other failure (a single provider erroring, a places lookup
/// failing, a cross-validation pair timing out) is absorbed and reflected
/// in `Metadata` instead of reaching this type.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("request is invalid: {0:?}")]
    InputInvalid(Vec<String>),

    #[error("no providers produced recommendations")]
    ExhaustedProviders,

    #[error("request was cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}
