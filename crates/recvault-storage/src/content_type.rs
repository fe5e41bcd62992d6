//! Extension to MIME type lookup for recorded media.

use std::path::Path;

/// Content type used when the extension is unknown.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Resolve the content type from the file extension (case-insensitive).
pub fn content_type_for(path: impl AsRef<Path>) -> &'static str {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("mkv") => "video/x-matroska",
        Some("flv") => "video/x-flv",
        Some("ts") => "video/mp2t",
        Some("m3u8") => "application/vnd.apple.mpegurl",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(content_type_for("a/b/2024-01-01.mp4"), "video/mp4");
        assert_eq!(content_type_for("rec.mkv"), "video/x-matroska");
        assert_eq!(content_type_for("rec.flv"), "video/x-flv");
        assert_eq!(content_type_for("seg.ts"), "video/mp2t");
        assert_eq!(content_type_for("live.m3u8"), "application/vnd.apple.mpegurl");
        assert_eq!(content_type_for("audio.mp3"), "audio/mpeg");
        assert_eq!(content_type_for("audio.m4a"), "audio/mp4");
        assert_eq!(content_type_for("audio.aac"), "audio/aac");
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        assert_eq!(content_type_for("meta.json"), "application/json");
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert_eq!(content_type_for("CLIP.MP4"), "video/mp4");
        assert_eq!(content_type_for("clip.Mkv"), "video/x-matroska");
        assert_eq!(content_type_for("Live.M3U8"), "application/vnd.apple.mpegurl");
    }

    #[test]
    fn test_unknown_extensions_default() {
        assert_eq!(content_type_for("movie.avi"), DEFAULT_CONTENT_TYPE);
        assert_eq!(content_type_for("no_extension"), DEFAULT_CONTENT_TYPE);
        assert_eq!(content_type_for(".mp4"), DEFAULT_CONTENT_TYPE);
    }
}
