/// Crate-wide result alias.
pub type RasterResult<T> = Result<T, RasterError>;

/// Error type shared by every rasterizer subsystem.
#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    /// A device buffer could not be created, or exceeds the configured limit.
    #[error("resource allocation error: {0}")]
    ResourceAllocation(String),

    /// The backend rejected a compute program.
    #[error("pipeline compilation error: {key}: {diagnostic}")]
    PipelineCompilation {
        /// Name of the program that failed to build.
        key: String,
        /// Backend diagnostic text.
        diagnostic: String,
    },

    /// A command buffer or encoder could not be opened, or the queue is gone.
    #[error("encoder creation error: {0}")]
    EncoderCreation(String),

    /// Caller supplied invalid input.
    #[error("validation error: {0}")]
    Validation(String),

    /// The session was already committed.
    #[error("encoder session already committed")]
    SessionCommitted,

    /// A batch flush failed earlier and the session can no longer record work.
    #[error("encoder session aborted after a failed flush")]
    SessionAborted,

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RasterError {
    /// Build [`RasterError::ResourceAllocation`].
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::ResourceAllocation(msg.into())
    }

    /// Build [`RasterError::PipelineCompilation`].
    pub fn compilation(key: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self::PipelineCompilation {
            key: key.into(),
            diagnostic: diagnostic.into(),
        }
    }

    /// Build [`RasterError::EncoderCreation`].
    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::EncoderCreation(msg.into())
    }

    /// Build [`RasterError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
