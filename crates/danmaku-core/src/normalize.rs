//! Conversion of raw comment records into renderer-ready [`Comment`]s.
//!
//! Entries that cannot be interpreted are dropped individually; one bad
//! record never fails the batch. Input order is preserved.

use tracing::{debug, warn};

use crate::models::{Comment, DanmakuMode, RawCommentEntry, DEFAULT_COLOR};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Use the raw mode code instead of scrolling every comment.
    pub respect_raw_mode: bool,
}

/// Normalize with default options: every comment scrolls.
pub fn normalize(raw: Vec<RawCommentEntry>) -> Vec<Comment> {
    normalize_with(raw, NormalizeOptions::default())
}

pub fn normalize_with(raw: Vec<RawCommentEntry>, options: NormalizeOptions) -> Vec<Comment> {
    let total = raw.len();
    let comments: Vec<Comment> = raw
        .into_iter()
        .filter_map(|entry| normalize_entry(entry, options))
        .collect();

    let dropped = total - comments.len();
    if dropped > 0 {
        warn!(dropped, total, "Dropped malformed comment entries");
    }
    comments
}

fn normalize_entry(entry: RawCommentEntry, options: NormalizeOptions) -> Option<Comment> {
    let (Some(params), Some(text)) = (entry.p, entry.m) else {
        debug!("Comment entry missing p or m");
        return None;
    };

    let fields: Vec<&str> = params.split(',').collect();
    if fields.len() < 3 {
        debug!(params = %params, "Comment entry has too few parameters");
        return None;
    }

    let time = match fields[0].trim().parse::<f64>() {
        Ok(t) if t.is_finite() && t >= 0.0 => t,
        _ => {
            debug!(params = %params, "Comment entry has invalid time");
            return None;
        }
    };

    let mode = if options.respect_raw_mode {
        fields[1]
            .trim()
            .parse::<u8>()
            .map(DanmakuMode::from_raw_code)
            .unwrap_or_default()
    } else {
        DanmakuMode::Scroll
    };

    let color = fields[2].trim().parse::<u32>().unwrap_or(DEFAULT_COLOR);

    Some(Comment {
        text,
        time,
        color,
        border: false,
        mode,
    })
}
