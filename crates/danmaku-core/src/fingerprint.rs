//! Partial-content hashing of media files.
//!
//! The match service identifies files by the MD5 of their first 16 MiB, so
//! only that window is ever read, regardless of file size.

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::models::{ChosenFile, FileProbe, Fingerprint};

/// Number of leading bytes that take part in the fingerprint.
pub const PROBE_WINDOW: u64 = 16 * 1024 * 1024;

/// Read the probe window of `file` and hash it.
pub async fn fingerprint(file: &ChosenFile) -> std::io::Result<Fingerprint> {
    let probe = probe_file(file).await?;
    let fingerprint = fingerprint_probe(&probe);
    debug!(
        file = %probe.name(),
        size = probe.size(),
        probed = probe.bytes().len(),
        fingerprint = %fingerprint,
        "Computed fingerprint"
    );
    Ok(fingerprint)
}

/// Read at most [`PROBE_WINDOW`] bytes from the start of `file`.
pub async fn probe_file(file: &ChosenFile) -> std::io::Result<FileProbe> {
    let handle = tokio::fs::File::open(&file.path).await?;
    let bytes = read_prefix(handle).await?;
    Ok(FileProbe::new(bytes, file.name.clone(), file.size))
}

/// Read at most [`PROBE_WINDOW`] bytes from `reader`.
pub async fn read_prefix<R: AsyncRead + Unpin>(reader: R) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.take(PROBE_WINDOW).read_to_end(&mut bytes).await?;
    Ok(bytes)
}

pub fn fingerprint_probe(probe: &FileProbe) -> Fingerprint {
    fingerprint_bytes(probe.bytes())
}

/// Hash the probe window of an in-memory buffer.
pub fn fingerprint_bytes(bytes: &[u8]) -> Fingerprint {
    let end = bytes.len().min(PROBE_WINDOW as usize);
    Fingerprint::from_digest(md5::compute(&bytes[..end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: usize = PROBE_WINDOW as usize;

    #[test]
    fn test_known_digests() {
        assert_eq!(
            fingerprint_bytes(b"").as_str(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            fingerprint_bytes(b"The quick brown fox jumps over the lazy dog").as_str(),
            "9e107d9d372bb6826bd81d3542a419d6"
        );
    }

    #[test]
    fn test_deterministic_and_content_sensitive() {
        let a = vec![1u8; 4096];
        let mut b = a.clone();
        b[2048] = 2;

        assert_eq!(fingerprint_bytes(&a), fingerprint_bytes(&a));
        assert_ne!(fingerprint_bytes(&a), fingerprint_bytes(&b));
    }

    #[test]
    fn test_bytes_past_window_are_ignored() {
        let mut long = vec![0xABu8; WINDOW + 1024];
        let baseline = fingerprint_bytes(&long[..WINDOW]);
        long[WINDOW + 10] = 0x00;

        assert_eq!(fingerprint_bytes(&long), baseline);
    }

    #[test]
    fn test_short_buffer_not_padded() {
        let short = vec![0u8; 1000];
        let padded = vec![0u8; 2000];
        assert_ne!(fingerprint_bytes(&short), fingerprint_bytes(&padded));
    }

    #[tokio::test]
    async fn test_read_prefix_stops_at_window() {
        let data = vec![5u8; WINDOW + 4096];
        let prefix = read_prefix(&data[..]).await.unwrap();
        assert_eq!(prefix.len(), WINDOW);

        let small = vec![5u8; 100];
        let prefix = read_prefix(&small[..]).await.unwrap();
        assert_eq!(prefix.len(), 100);
    }

    #[tokio::test]
    async fn test_file_fingerprint_matches_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episode.mkv");
        let data: Vec<u8> = (0..WINDOW + 8192).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &data).unwrap();

        let file = ChosenFile::from_path(&path).await.unwrap();
        assert_eq!(file.size, data.len() as u64);

        let probe = probe_file(&file).await.unwrap();
        assert_eq!(probe.bytes().len(), WINDOW);
        assert_eq!(probe.size(), data.len() as u64);

        let fp = fingerprint(&file).await.unwrap();
        assert_eq!(fp, fingerprint_bytes(&data[..WINDOW]));
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let file = ChosenFile {
            path: "/nonexistent/danmaku/episode.mkv".into(),
            name: "episode.mkv".into(),
            size: 10,
        };
        let err = fingerprint(&file).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
