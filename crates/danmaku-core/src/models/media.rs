use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

/// A file the user picked for playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenFile {
    /// Absolute path to the media file.
    pub path: PathBuf,
    /// Declared file name, as sent to the match service.
    pub name: String,
    /// Total size in bytes, not just the hashed prefix.
    pub size: u64,
}

impl ChosenFile {
    /// Resolve a path into a chosen file, reading its size from the filesystem.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = tokio::fs::canonicalize(path.as_ref()).await?;
        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path,
            name,
            size: metadata.len(),
        })
    }
}

/// The bytes read for hashing: at most the probe window of the source file.
#[derive(Debug)]
pub struct FileProbe {
    bytes: Vec<u8>,
    name: String,
    size: u64,
}

impl FileProbe {
    pub fn new(bytes: Vec<u8>, name: impl Into<String>, size: u64) -> Self {
        Self {
            bytes,
            name: name.into(),
            size,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Lowercase hex MD5 digest of a file prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub(crate) fn from_digest(digest: md5::Digest) -> Self {
        Self(format!("{digest:x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outbound payload for the match endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuery {
    pub file_hash: Fingerprint,
    pub file_name: String,
    pub file_size: u64,
}

impl MatchQuery {
    pub fn new(fingerprint: Fingerprint, file: &ChosenFile) -> Self {
        Self {
            file_hash: fingerprint,
            file_name: file.name.clone(),
            file_size: file.size,
        }
    }
}

/// Episode identifier as issued by the match service.
///
/// The live service sends integers, but string ids are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EpisodeId(String);

impl EpisodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for EpisodeId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for EpisodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(u64),
            Text(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Number(n) => Ok(Self::from(n)),
            Wire::Text(s) if !s.trim().is_empty() => Ok(Self(s)),
            Wire::Text(_) => Err(serde::de::Error::custom("empty episode id")),
        }
    }
}

/// One episode the match service proposes for a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub episode_id: EpisodeId,
    pub anime_title: String,
    pub episode_title: String,
    /// Whether the service reported the match as exact rather than fuzzy.
    pub is_exact_match: bool,
}

/// A well-formed answer from the match service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub error_code: i32,
    pub error_message: Option<String>,
    pub is_matched: bool,
    /// Candidates in service order; the first one is authoritative.
    pub matches: Vec<MatchCandidate>,
}
