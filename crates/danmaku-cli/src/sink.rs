use std::sync::Arc;

use danmaku_runtime::{PlaybackSink, PlaybackSource, StatusSink};

/// Prints status lines to stderr.
pub struct TerminalStatus;

impl StatusSink for TerminalStatus {
    fn on_status_change(&self, message: &str) {
        eprintln!("状态: {message}");
    }
}

/// The CLI has no player; it reports what would be played and leaves the
/// JSON output to `main`.
pub struct LoggedPlayback;

impl PlaybackSink for LoggedPlayback {
    fn configure(&self, source: Arc<PlaybackSource>) {
        tracing::info!(
            source = %source.source_url,
            comments = source.comments.len(),
            "Playback configured"
        );
    }
}
