//! Object key and label derivation from local paths.
//!
//! Recordings live under `downloads/{platform}/{anchor}/...`; the part after
//! the root marker becomes the bucket key and its first two components name
//! the platform and anchor.

use std::path::Path;

/// Path segment that marks the local recordings root.
pub const DEFAULT_ROOT_MARKER: &str = "downloads";

/// Label used when the platform or anchor cannot be inferred.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Non-empty path segments, split on both `/` and `\`.
fn segments(text: &str) -> Vec<&str> {
    text.split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .collect()
}

/// Derive the bucket key for a local file.
///
/// The segments after the first segment equal to `marker` become the key.
/// Without such a segment the whole path is used. Backslashes are always
/// normalized to `/`.
pub fn derive_object_key(local_path: &Path, marker: &str) -> String {
    let text = local_path.to_string_lossy();
    let parts = segments(&text);

    match parts.iter().position(|part| *part == marker) {
        Some(idx) => parts[idx + 1..].join("/"),
        None => text.replace('\\', "/"),
    }
}

/// Platform and anchor labels inferred from a recording's location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLabels {
    pub platform: String,
    pub anchor: String,
}

impl SourceLabels {
    pub fn new(platform: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            anchor: anchor.into(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_LABEL, UNKNOWN_LABEL)
    }

    /// Infer labels from the two path components following the marker
    /// component. Falls back to `unknown` for both when fewer than two
    /// components follow it.
    pub fn infer(local_path: &Path, marker: &str) -> Self {
        let text = local_path.to_string_lossy();
        let parts = segments(&text);

        let Some(idx) = parts.iter().position(|part| *part == marker) else {
            return Self::unknown();
        };

        match (parts.get(idx + 1), parts.get(idx + 2)) {
            (Some(platform), Some(anchor)) => Self::new(*platform, *anchor),
            _ => Self::unknown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_after_marker() {
        let path = Path::new("downloads/douyin/annie/2024-01-01.mp4");
        assert_eq!(
            derive_object_key(path, DEFAULT_ROOT_MARKER),
            "douyin/annie/2024-01-01.mp4"
        );
    }

    #[test]
    fn test_key_absolute_path_with_marker() {
        let path = Path::new("/srv/recorder/downloads/tiktok/bob/live.flv");
        assert_eq!(derive_object_key(path, DEFAULT_ROOT_MARKER), "tiktok/bob/live.flv");
    }

    #[test]
    fn test_key_backslashes_normalized() {
        let path = Path::new(r"C:\rec\downloads\douyin\annie\a.mp4");
        assert_eq!(derive_object_key(path, DEFAULT_ROOT_MARKER), "douyin/annie/a.mp4");
    }

    #[test]
    fn test_key_without_marker_keeps_full_path() {
        let path = Path::new("videos/douyin/a.mp4");
        assert_eq!(derive_object_key(path, DEFAULT_ROOT_MARKER), "videos/douyin/a.mp4");

        let path = Path::new(r"videos\douyin\a.mp4");
        assert_eq!(derive_object_key(path, DEFAULT_ROOT_MARKER), "videos/douyin/a.mp4");
    }

    #[test]
    fn test_key_custom_marker() {
        let path = Path::new("/data/recordings/kick/carol/x.ts");
        assert_eq!(derive_object_key(path, "recordings"), "kick/carol/x.ts");
    }

    #[test]
    fn test_key_never_contains_marker_prefix() {
        let key = derive_object_key(Path::new("/a/downloads/p/b/c.mp4"), DEFAULT_ROOT_MARKER);
        assert!(!key.starts_with('/'));
        assert!(!key.contains("downloads"));

        let key = derive_object_key(
            Path::new("/srv/mydownloads/downloads/douyin/annie/x.mp4"),
            DEFAULT_ROOT_MARKER,
        );
        assert_eq!(key, "douyin/annie/x.mp4");
    }

    #[test]
    fn test_key_marker_must_be_whole_segment() {
        let path = Path::new("/videos/douyin/my_downloads_2024.mp4");
        assert_eq!(
            derive_object_key(path, DEFAULT_ROOT_MARKER),
            "/videos/douyin/my_downloads_2024.mp4"
        );

        let path = Path::new("/srv/mydownloads/douyin/a.mp4");
        assert_eq!(
            derive_object_key(path, DEFAULT_ROOT_MARKER),
            "/srv/mydownloads/douyin/a.mp4"
        );
    }

    #[test]
    fn test_key_and_labels_agree() {
        let path = Path::new("/srv/mydownloads/downloads/douyin/annie/x.mp4");
        let labels = SourceLabels::infer(path, DEFAULT_ROOT_MARKER);
        let key = derive_object_key(path, DEFAULT_ROOT_MARKER);

        assert_eq!(labels, SourceLabels::new("douyin", "annie"));
        assert!(key.starts_with("douyin/annie/"));
    }

    #[test]
    fn test_infer_labels_backslashes() {
        let labels = SourceLabels::infer(
            Path::new(r"C:\rec\downloads\douyin\annie\a.mp4"),
            DEFAULT_ROOT_MARKER,
        );
        assert_eq!(labels, SourceLabels::new("douyin", "annie"));
    }

    #[test]
    fn test_infer_labels() {
        let labels = SourceLabels::infer(
            Path::new("downloads/douyin/annie/2024-01-01.mp4"),
            DEFAULT_ROOT_MARKER,
        );
        assert_eq!(labels, SourceLabels::new("douyin", "annie"));
    }

    #[test]
    fn test_infer_labels_absolute() {
        let labels = SourceLabels::infer(
            Path::new("/srv/downloads/bilibili/dave/part1/clip.mp4"),
            DEFAULT_ROOT_MARKER,
        );
        assert_eq!(labels, SourceLabels::new("bilibili", "dave"));
    }

    #[test]
    fn test_infer_labels_too_shallow() {
        let labels = SourceLabels::infer(Path::new("/srv/downloads/clip.mp4"), DEFAULT_ROOT_MARKER);
        assert_eq!(labels, SourceLabels::unknown());
    }

    #[test]
    fn test_infer_labels_without_marker() {
        let labels = SourceLabels::infer(Path::new("/srv/videos/a/b/c.mp4"), DEFAULT_ROOT_MARKER);
        assert_eq!(labels, SourceLabels::unknown());
    }

    #[test]
    fn test_infer_labels_marker_must_be_whole_component() {
        let labels = SourceLabels::infer(
            Path::new("/srv/mydownloads/douyin/annie/a.mp4"),
            DEFAULT_ROOT_MARKER,
        );
        assert_eq!(labels, SourceLabels::unknown());
    }
}
