//! Seams between the pipeline and the remote services.
//!
//! [`DandanClient`](crate::DandanClient) implements both traits; the
//! orchestrator only depends on the traits so it can run against mocks.

use std::future::Future;

use danmaku_core::models::{EpisodeId, MatchOutcome, MatchQuery, RawCommentEntry};

use crate::error::ApiError;

/// Identifies an episode from a file fingerprint.
pub trait MatchService: Send + Sync {
    /// Send one match request. A well-formed negative answer is `Ok`.
    fn match_file(
        &self,
        query: &MatchQuery,
    ) -> impl Future<Output = Result<MatchOutcome, ApiError>> + Send;
}

/// Supplies the raw comment stream of an episode.
pub trait CommentService: Send + Sync {
    /// Fetch every raw comment for `episode_id`. Zero comments is `Ok`.
    fn fetch_raw(
        &self,
        episode_id: &EpisodeId,
    ) -> impl Future<Output = Result<Vec<RawCommentEntry>, ApiError>> + Send;
}
