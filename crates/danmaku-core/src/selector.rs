use crate::error::NoMatchFound;
use crate::models::MatchCandidate;

/// Pick the candidate to play.
///
/// The service's ordering is authoritative: the first candidate wins,
/// whatever the remaining candidates look like.
pub fn select(matches: &[MatchCandidate]) -> Result<&MatchCandidate, NoMatchFound> {
    matches.first().ok_or_else(NoMatchFound::empty)
}
