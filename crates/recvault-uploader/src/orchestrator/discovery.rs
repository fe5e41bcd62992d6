//! Candidate file discovery for directory uploads.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

/// Extensions uploaded when no format filter is given.
pub const DEFAULT_VIDEO_EXTENSIONS: [&str; 8] =
    ["mp4", "mkv", "flv", "ts", "m3u8", "avi", "mov", "wmv"];

/// Set of lowercase file extensions (without the dot) to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_VIDEO_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl ExtensionFilter {
    /// Parse a comma-separated list such as `mp4, .FLV`.
    ///
    /// The list replaces the default set entirely.
    pub fn parse(list: &str) -> Self {
        Self {
            extensions: list
                .split(',')
                .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// Use `filter` when it names at least one extension, otherwise the
    /// default video set.
    pub fn from_option(filter: Option<&str>) -> Self {
        filter
            .map(Self::parse)
            .filter(|parsed| !parsed.extensions.is_empty())
            .unwrap_or_default()
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_ascii_lowercase()))
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

/// Recursively collect files under `dir` accepted by `filter`, in walk order.
///
/// Unreadable entries are logged and skipped.
pub fn find_candidates(dir: &Path, filter: &ExtensionFilter) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && filter.matches(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"data").unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        let mut names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_default_filter() {
        let filter = ExtensionFilter::default();
        assert!(filter.matches(Path::new("a.mp4")));
        assert!(filter.matches(Path::new("a.WMV")));
        assert!(filter.matches(Path::new("seg.ts")));
        assert!(!filter.matches(Path::new("b.txt")));
        assert!(!filter.matches(Path::new("noext")));
        assert_eq!(filter.extensions().count(), 8);
    }

    #[test]
    fn test_custom_filter_replaces_defaults() {
        let filter = ExtensionFilter::parse(" FLV, .txt ,,");
        assert_eq!(filter.extensions().collect::<Vec<_>>(), vec!["flv", "txt"]);
        assert!(filter.matches(Path::new("a.flv")));
        assert!(filter.matches(Path::new("b.TXT")));
        assert!(!filter.matches(Path::new("c.mp4")));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(ExtensionFilter::from_option(None), ExtensionFilter::default());
        assert_eq!(
            ExtensionFilter::from_option(Some("mkv")),
            ExtensionFilter::parse("mkv")
        );
    }

    #[test]
    fn test_blank_filter_uses_defaults() {
        for blank in ["", "  ", ",", " , ,. "] {
            assert_eq!(
                ExtensionFilter::from_option(Some(blank)),
                ExtensionFilter::default(),
                "{blank:?} should fall back to the video set"
            );
        }
    }

    #[test]
    fn test_find_candidates_default_filter() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.mp4"));
        touch(&dir.path().join("b.txt"));
        touch(&dir.path().join("c.mkv"));

        let found = find_candidates(dir.path(), &ExtensionFilter::default());
        assert_eq!(names(&found), vec!["a.mp4", "c.mkv"]);
    }

    #[test]
    fn test_find_candidates_recurses() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("downloads/douyin/annie/1.flv"));
        touch(&dir.path().join("downloads/douyin/bob/2.mp4"));
        touch(&dir.path().join("downloads/readme.txt"));
        std::fs::create_dir_all(dir.path().join("empty.mp4")).unwrap();

        let found = find_candidates(dir.path(), &ExtensionFilter::default());
        assert_eq!(names(&found), vec!["1.flv", "2.mp4"]);
    }

    #[test]
    fn test_find_candidates_custom_filter() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.mp4"));
        touch(&dir.path().join("b.txt"));

        let found = find_candidates(dir.path(), &ExtensionFilter::parse("txt"));
        assert_eq!(names(&found), vec!["b.txt"]);
    }
}
