mod error;
mod session;
mod status;

pub use error::PipelineError;
pub use session::{PlaybackSink, PlaybackSource, ReadyRun, RunOutcome, Session, StatusSink};
pub use status::{MatchSummary, PipelineStatus};
