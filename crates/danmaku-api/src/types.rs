use serde::Deserialize;
use serde_json::Value;

use danmaku_core::models::{EpisodeId, MatchCandidate, MatchOutcome, RawCommentEntry};

use crate::error::ApiError;

// ── Match responses ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub error_code: i32,
    pub error_message: Option<String>,
    pub is_matched: bool,
    /// Absent or `null` when the service has nothing to offer.
    pub matches: Option<Vec<MatchEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEntry {
    pub episode_id: EpisodeId,
    pub anime_title: String,
    pub episode_title: String,
}

// ── Comment responses ───────────────────────────────────────────

/// Only the collection itself is checked here; entries are read one by one
/// so a single odd entry cannot fail the batch.
#[derive(Debug, Deserialize)]
pub struct CommentResponse {
    pub comments: Vec<Value>,
}

// ── Parsing and conversions ─────────────────────────────────────

pub fn parse_match_response(body: &str) -> Result<MatchResponse, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

pub fn parse_comment_response(body: &str) -> Result<CommentResponse, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

impl MatchResponse {
    pub fn into_outcome(self) -> MatchOutcome {
        let is_matched = self.is_matched;
        MatchOutcome {
            error_code: self.error_code,
            error_message: self.error_message.filter(|m| !m.is_empty()),
            is_matched,
            matches: self
                .matches
                .unwrap_or_default()
                .into_iter()
                .map(|entry| entry.into_candidate(is_matched))
                .collect(),
        }
    }
}

impl CommentResponse {
    pub fn into_entries(self) -> Vec<RawCommentEntry> {
        self.comments.iter().map(raw_entry).collect()
    }
}

/// Take `p` and `m` when they are strings; anything else becomes `None`.
fn raw_entry(value: &Value) -> RawCommentEntry {
    let text_field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
    RawCommentEntry {
        p: text_field("p"),
        m: text_field("m"),
    }
}

impl MatchEntry {
    pub fn into_candidate(self, is_exact_match: bool) -> MatchCandidate {
        MatchCandidate {
            episode_id: self.episode_id,
            anime_title: self.anime_title,
            episode_title: self.episode_title,
            is_exact_match,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_match_response() {
        let json = r#"{
            "isMatched": true,
            "matches": [
                {
                    "episodeId": 163860001,
                    "animeId": 16386,
                    "animeTitle": "葬送的芙莉莲",
                    "episodeTitle": "第1话 冒险结束",
                    "type": "tvseries",
                    "typeDescription": "TV动画",
                    "shift": 0
                },
                {
                    "episodeId": 163860002,
                    "animeId": 16386,
                    "animeTitle": "葬送的芙莉莲",
                    "episodeTitle": "第2话 不用那样的魔法也没关系",
                    "type": "tvseries",
                    "shift": 0
                }
            ],
            "errorCode": 0,
            "success": true,
            "errorMessage": ""
        }"#;

        let outcome = parse_match_response(json).unwrap().into_outcome();
        assert_eq!(outcome.error_code, 0);
        assert!(outcome.is_matched);
        assert!(outcome.error_message.is_none());
        assert_eq!(outcome.matches.len(), 2);

        let first = &outcome.matches[0];
        assert_eq!(first.episode_id.as_str(), "163860001");
        assert_eq!(first.anime_title, "葬送的芙莉莲");
        assert_eq!(first.episode_title, "第1话 冒险结束");
        assert!(first.is_exact_match);
    }

    #[test]
    fn test_deserialize_string_episode_id() {
        let json = r#"{
            "errorCode": 0,
            "isMatched": false,
            "matches": [{ "episodeId": "42", "animeTitle": "X", "episodeTitle": "Y" }]
        }"#;

        let outcome = parse_match_response(json).unwrap().into_outcome();
        assert!(!outcome.is_matched);
        assert_eq!(outcome.matches[0].episode_id.as_str(), "42");
        assert!(!outcome.matches[0].is_exact_match);
    }

    #[test]
    fn test_null_matches_is_empty() {
        let json = r#"{
            "errorCode": 6,
            "success": false,
            "errorMessage": "hash invalid",
            "isMatched": false,
            "matches": null
        }"#;

        let outcome = parse_match_response(json).unwrap().into_outcome();
        assert_eq!(outcome.error_code, 6);
        assert_eq!(outcome.error_message.as_deref(), Some("hash invalid"));
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_match_response_rejects_bad_shapes() {
        // Not JSON.
        assert!(matches!(
            parse_match_response("<html>502</html>"),
            Err(ApiError::Parse(_))
        ));
        // Missing errorCode.
        assert!(parse_match_response(r#"{ "isMatched": true, "matches": [] }"#).is_err());
        // errorCode of the wrong type.
        assert!(
            parse_match_response(r#"{ "errorCode": "0", "isMatched": true, "matches": [] }"#)
                .is_err()
        );
        // Candidate without a title.
        assert!(parse_match_response(
            r#"{ "errorCode": 0, "isMatched": true, "matches": [{ "episodeId": 1, "episodeTitle": "Y" }] }"#
        )
        .is_err());
    }

    #[test]
    fn test_deserialize_comment_response() {
        let json = r#"{
            "count": 3,
            "comments": [
                { "cid": 1, "p": "12.50,1,16777215,[Gamer]abc", "m": "hello" },
                { "cid": 2, "p": "30.00,5,16711680,[BiliBili]def", "m": "world" },
                { "cid": 3, "m": "no params" }
            ]
        }"#;

        let entries = parse_comment_response(json).unwrap().into_entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].p.as_deref(), Some("12.50,1,16777215,[Gamer]abc"));
        assert_eq!(entries[1].m.as_deref(), Some("world"));
        assert!(entries[2].p.is_none());
    }

    #[test]
    fn test_empty_comment_list_is_ok() {
        let resp = parse_comment_response(r#"{ "count": 0, "comments": [] }"#).unwrap();
        assert!(resp.into_entries().is_empty());
    }

    #[test]
    fn test_odd_comment_entries_do_not_fail_batch() {
        let json = r#"{
            "count": "three",
            "comments": [
                { "cid": 1, "p": "1,1,255", "m": "good" },
                { "cid": "x", "p": "2,1,255", "m": "odd cid" },
                { "cid": 3, "p": 5, "m": "numeric p" },
                { "cid": 4, "p": "3,1,255", "m": ["not", "text"] },
                42
            ]
        }"#;

        let entries = parse_comment_response(json).unwrap().into_entries();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0], RawCommentEntry::new("1,1,255", "good"));
        assert_eq!(entries[1], RawCommentEntry::new("2,1,255", "odd cid"));
        assert!(entries[2].p.is_none());
        assert!(entries[3].m.is_none());
        assert_eq!(entries[4], RawCommentEntry::default());

        let comments = danmaku_core::normalize::normalize(entries);
        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["good", "odd cid"]);
    }

    #[test]
    fn test_unused_match_fields_are_not_validated() {
        let json = r#"{
            "errorCode": 0,
            "success": "yes",
            "isMatched": true,
            "matches": [{
                "episodeId": 163860001,
                "animeId": "16386",
                "animeTitle": "葬送的芙莉莲",
                "episodeTitle": "第1话",
                "type": 7,
                "shift": "none"
            }]
        }"#;

        let outcome = parse_match_response(json).unwrap().into_outcome();
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].episode_id.as_str(), "163860001");
    }

    #[test]
    fn test_comment_response_requires_collection() {
        assert!(parse_comment_response(r#"{ "count": 0 }"#).is_err());
        assert!(parse_comment_response(r#"{ "comments": null }"#).is_err());
        assert!(parse_comment_response(r#"{ "comments": {} }"#).is_err());
    }
}
