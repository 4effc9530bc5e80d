//! The fingerprint → match → select → fetch → normalize pipeline.
//!
//! A [`Session`] owns the state of the current run. Each file selection
//! starts a new run with a fresh [`RunToken`]; a run whose token has been
//! superseded by a later selection (or a [`Session::reset`]) stops at its
//! next checkpoint and never touches session state or collaborators.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use danmaku_api::{CommentService, MatchService};
use danmaku_core::error::NoMatchFound;
use danmaku_core::fingerprint;
use danmaku_core::models::{ChosenFile, Comment, MatchQuery};
use danmaku_core::normalize::{normalize_with, NormalizeOptions};
use danmaku_core::selector;

use crate::error::PipelineError;
use crate::status::{MatchSummary, PipelineStatus};

/// Receives every status change of the current run.
pub trait StatusSink: Send + Sync {
    fn on_status_change(&self, message: &str);
}

/// Receives the playable media and its comments once a run is ready.
pub trait PlaybackSink: Send + Sync {
    fn configure(&self, source: Arc<PlaybackSource>);
}

/// What the player needs: where the media is and what to overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSource {
    pub source_url: String,
    pub comments: Vec<Comment>,
}

/// A completed run.
#[derive(Debug, Clone)]
pub struct ReadyRun {
    pub summary: MatchSummary,
    pub playback: Arc<PlaybackSource>,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    Ready(ReadyRun),
    Failed(PipelineError),
    /// A newer run (or a reset) took over; this run's result was discarded.
    Superseded { run_id: u64 },
}

/// Identity of one run, checked after every suspension point.
#[derive(Debug, Clone)]
struct RunToken {
    id: u64,
    current: Arc<AtomicU64>,
}

impl RunToken {
    fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.id
    }
}

#[derive(Debug, Default)]
struct SessionState {
    status: PipelineStatus,
    playback: Option<Arc<PlaybackSource>>,
}

pub struct Session<M, C> {
    matcher: M,
    comments: C,
    options: NormalizeOptions,
    status_sink: Box<dyn StatusSink>,
    playback_sink: Box<dyn PlaybackSink>,
    state: RwLock<SessionState>,
    run_counter: Arc<AtomicU64>,
}

impl<M: MatchService, C: CommentService> Session<M, C> {
    pub fn new(
        matcher: M,
        comments: C,
        status_sink: Box<dyn StatusSink>,
        playback_sink: Box<dyn PlaybackSink>,
    ) -> Self {
        Self {
            matcher,
            comments,
            options: NormalizeOptions::default(),
            status_sink,
            playback_sink,
            state: RwLock::new(SessionState::default()),
            run_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn status(&self) -> PipelineStatus {
        self.state.read().await.status.clone()
    }

    /// The playback handed out by the last run that reached `Ready`.
    pub async fn playback(&self) -> Option<Arc<PlaybackSource>> {
        self.state.read().await.playback.clone()
    }

    /// Drop all run state and invalidate any run still in flight.
    pub async fn reset(&self) {
        let run_id = self.run_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.write().await;
        *state = SessionState::default();
        debug!(run_id, "Session reset");
        self.status_sink
            .on_status_change(&PipelineStatus::Idle.message());
    }

    /// Run the whole pipeline for a newly chosen file.
    pub async fn on_file_chosen(&self, file: ChosenFile) -> RunOutcome {
        let token = self.begin_run().await;
        info!(run_id = token.id, file = %file.name, size = file.size, "File chosen");

        match self.execute(&token, &file).await {
            Ok(Some(ready)) => RunOutcome::Ready(ready),
            Ok(None) => self.superseded(&token),
            Err(err) => {
                warn!(run_id = token.id, error = %err, "Run failed");
                if self.transition(&token, err.status()).await {
                    RunOutcome::Failed(err)
                } else {
                    self.superseded(&token)
                }
            }
        }
    }

    async fn begin_run(&self) -> RunToken {
        let id = self.run_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = std::mem::take(&mut *self.state.write().await);
        if previous.playback.is_some() {
            debug!(run_id = id, "Releasing previous playback");
        }
        drop(previous);
        RunToken {
            id,
            current: Arc::clone(&self.run_counter),
        }
    }

    fn superseded(&self, token: &RunToken) -> RunOutcome {
        debug!(run_id = token.id, "Run superseded, discarding result");
        RunOutcome::Superseded { run_id: token.id }
    }

    /// Move the session to `status` if `token` still owns it.
    ///
    /// Sinks are notified while the state lock is held, so collaborators see
    /// changes in the same order the session applies them.
    async fn transition(&self, token: &RunToken, status: PipelineStatus) -> bool {
        let mut state = self.state.write().await;
        if !token.is_current() {
            return false;
        }
        debug!(
            run_id = token.id,
            from = state.status.label(),
            to = status.label(),
            "Status change"
        );
        self.status_sink.on_status_change(&status.message());
        state.status = status;
        true
    }

    /// `Ok(None)` means the run was superseded along the way.
    async fn execute(
        &self,
        token: &RunToken,
        file: &ChosenFile,
    ) -> Result<Option<ReadyRun>, PipelineError> {
        if !self.transition(token, PipelineStatus::Matching).await {
            return Ok(None);
        }

        let source_url = Url::from_file_path(&file.path).map_err(|()| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not an absolute path", file.path.display()),
            )
        })?;

        let fingerprint = fingerprint::fingerprint(file).await?;
        if !token.is_current() {
            return Ok(None);
        }

        let query = MatchQuery::new(fingerprint, file);
        let outcome = self
            .matcher
            .match_file(&query)
            .await
            .map_err(PipelineError::MatchService)?;
        if !token.is_current() {
            return Ok(None);
        }

        if outcome.error_code != 0 || outcome.matches.is_empty() {
            return Err(NoMatchFound {
                error_code: outcome.error_code,
                message: outcome.error_message,
            }
            .into());
        }

        if !self.transition(token, PipelineStatus::Selecting).await {
            return Ok(None);
        }
        let candidate = selector::select(&outcome.matches)?.clone();
        info!(
            run_id = token.id,
            episode_id = %candidate.episode_id,
            anime = %candidate.anime_title,
            episode = %candidate.episode_title,
            exact = outcome.is_matched,
            "Selected match"
        );

        if !self.transition(token, PipelineStatus::FetchingComments).await {
            return Ok(None);
        }
        let raw = self
            .comments
            .fetch_raw(&candidate.episode_id)
            .await
            .map_err(PipelineError::CommentService)?;
        if !token.is_current() {
            return Ok(None);
        }

        let comments = normalize_with(raw, self.options);
        let summary = MatchSummary::new(&candidate, outcome.is_matched, comments.len());
        let playback = Arc::new(PlaybackSource {
            source_url: source_url.into(),
            comments,
        });

        let status = PipelineStatus::Ready(summary.clone());
        let mut state = self.state.write().await;
        if !token.is_current() {
            return Ok(None);
        }
        info!(run_id = token.id, comments = summary.comment_count, "Run ready");
        self.status_sink.on_status_change(&status.message());
        self.playback_sink.configure(Arc::clone(&playback));
        state.status = status;
        state.playback = Some(Arc::clone(&playback));
        drop(state);

        Ok(Some(ReadyRun { summary, playback }))
    }
}
