use std::fmt;

use danmaku_core::models::{EpisodeId, MatchCandidate};

/// What the pipeline is doing for the current run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineStatus {
    #[default]
    Idle,
    Matching,
    Selecting,
    MatchFailed,
    FetchingComments,
    CommentsFailed,
    Ready(MatchSummary),
}

impl PipelineStatus {
    /// Text shown to the user for this status.
    pub fn message(&self) -> String {
        match self {
            Self::Idle => "请先选择文件".into(),
            Self::Matching | Self::Selecting => "正在匹配".into(),
            Self::MatchFailed => "匹配失败".into(),
            Self::FetchingComments => "正在获取弹幕".into(),
            Self::CommentsFailed => "弹幕获取失败".into(),
            Self::Ready(summary) => summary.to_string(),
        }
    }

    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Matching => "matching",
            Self::Selecting => "selecting",
            Self::MatchFailed => "match_failed",
            Self::FetchingComments => "fetching_comments",
            Self::CommentsFailed => "comments_failed",
            Self::Ready(_) => "ready",
        }
    }
}

/// Description of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSummary {
    pub is_matched: bool,
    pub episode_id: EpisodeId,
    pub anime_title: String,
    pub episode_title: String,
    pub comment_count: usize,
}

impl MatchSummary {
    pub fn new(candidate: &MatchCandidate, is_matched: bool, comment_count: usize) -> Self {
        Self {
            is_matched,
            episode_id: candidate.episode_id.clone(),
            anime_title: candidate.anime_title.clone(),
            episode_title: candidate.episode_title.clone(),
            comment_count,
        }
    }
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = if self.is_matched { "精确" } else { "模糊" };
        write!(
            f,
            "[{precision}] [{}] {} {} -> {} 条弹幕",
            self.episode_id, self.anime_title, self.episode_title, self.comment_count
        )
    }
}
