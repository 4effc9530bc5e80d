mod comment;
mod media;

pub use comment::{Comment, DanmakuMode, RawCommentEntry, DEFAULT_COLOR};
pub use media::{ChosenFile, EpisodeId, FileProbe, Fingerprint, MatchCandidate, MatchOutcome, MatchQuery};
