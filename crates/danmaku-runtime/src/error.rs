use danmaku_api::ApiError;
use danmaku_core::error::NoMatchFound;
use thiserror::Error;

use crate::status::PipelineStatus;

/// Why a run stopped before reaching `Ready`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not read media file: {0}")]
    Read(#[from] std::io::Error),

    #[error("match service error: {0}")]
    MatchService(#[source] ApiError),

    #[error(transparent)]
    NoMatchFound(#[from] NoMatchFound),

    #[error("comment service error: {0}")]
    CommentService(#[source] ApiError),
}

impl PipelineError {
    /// The terminal status a run ends in after this error.
    pub fn status(&self) -> PipelineStatus {
        match self {
            Self::Read(_) | Self::MatchService(_) | Self::NoMatchFound(_) => {
                PipelineStatus::MatchFailed
            }
            Self::CommentService(_) => PipelineStatus::CommentsFailed,
        }
    }
}
