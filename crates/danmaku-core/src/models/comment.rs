use serde::{Serialize, Serializer};

/// Fallback color (white) when a raw entry carries no usable color value.
pub const DEFAULT_COLOR: u32 = 0xFF_FF_FF;

/// Display modes understood by the overlay renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum DanmakuMode {
    #[default]
    Scroll = 0,
    Top = 1,
    Bottom = 2,
}

impl DanmakuMode {
    /// Map a raw comment-service mode code.
    ///
    /// 1-3 are scrolling variants, 4 is pinned bottom, 5 is pinned top.
    /// Unknown codes scroll.
    pub fn from_raw_code(code: u8) -> Self {
        match code {
            4 => Self::Bottom,
            5 => Self::Top,
            _ => Self::Scroll,
        }
    }
}

impl Serialize for DanmakuMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// A comment as handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub text: String,
    /// Offset into the episode, in seconds. Never negative.
    pub time: f64,
    /// 24-bit RGB.
    pub color: u32,
    pub border: bool,
    pub mode: DanmakuMode,
}

/// A comment record straight off the wire.
///
/// `p` is `"time,mode,color,..."`; `m` is the display text. Either is `None`
/// when the service sent it missing or as a non-string, and normalization
/// drops such entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawCommentEntry {
    pub p: Option<String>,
    pub m: Option<String>,
}

impl RawCommentEntry {
    pub fn new(p: impl Into<String>, m: impl Into<String>) -> Self {
        Self {
            p: Some(p.into()),
            m: Some(m.into()),
        }
    }
}
