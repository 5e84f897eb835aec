//! External media references attached to chapters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
    Pdf,
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Video, MediaKind::Audio, MediaKind::Pdf];
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Pdf => "pdf",
        })
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            "pdf" => Ok(MediaKind::Pdf),
            other => Err(format!("unknown media kind `{other}` (video, audio, pdf)")),
        }
    }
}

/// A named link to a video, audio stream or PDF document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl MediaItem {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            tags: Vec::new(),
        }
    }
}

/// Known tags per media kind, offered as suggestions
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaTags {
    #[serde(default)]
    pub video: Vec<String>,

    #[serde(default)]
    pub audio: Vec<String>,

    #[serde(default)]
    pub pdf: Vec<String>,
}

impl MediaTags {
    pub fn tags(&self, kind: MediaKind) -> &[String] {
        match kind {
            MediaKind::Video => &self.video,
            MediaKind::Audio => &self.audio,
            MediaKind::Pdf => &self.pdf,
        }
    }

    fn tags_mut(&mut self, kind: MediaKind) -> &mut Vec<String> {
        match kind {
            MediaKind::Video => &mut self.video,
            MediaKind::Audio => &mut self.audio,
            MediaKind::Pdf => &mut self.pdf,
        }
    }

    /// Register a tag. Returns false for blank or already known tags.
    pub fn add(&mut self, kind: MediaKind, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags(kind).iter().any(|t| t == tag) {
            return false;
        }
        self.tags_mut(kind).push(tag.to_string());
        true
    }

    pub fn remove(&mut self, kind: MediaKind, tag: &str) -> bool {
        let tags = self.tags_mut(kind);
        let before = tags.len();
        tags.retain(|t| t != tag);
        tags.len() != before
    }
}

/// Player URL for a YouTube or Vimeo link, `None` for other hosts
pub fn video_embed_url(url: &str) -> Option<String> {
    let last_segment = || {
        url.trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if url.contains("youtube.com") || url.contains("youtu.be") {
        let id = match url.split_once("v=") {
            Some((_, rest)) => rest.split('&').next().map(str::to_string),
            None => last_segment(),
        }?;
        Some(format!("https://www.youtube.com/embed/{id}"))
    } else if url.contains("vimeo.com") {
        last_segment().map(|id| format!("https://player.vimeo.com/video/{id}"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_embed() {
        assert_eq!(
            video_embed_url("https://www.youtube.com/watch?v=abc123&t=4").as_deref(),
            Some("https://www.youtube.com/embed/abc123")
        );
        assert_eq!(
            video_embed_url("https://youtu.be/xyz789").as_deref(),
            Some("https://www.youtube.com/embed/xyz789")
        );
    }

    #[test]
    fn test_vimeo_embed() {
        assert_eq!(
            video_embed_url("https://vimeo.com/76979871").as_deref(),
            Some("https://player.vimeo.com/video/76979871")
        );
    }

    #[test]
    fn test_other_hosts_are_not_embeddable() {
        assert_eq!(video_embed_url("https://example.com/movie.mp4"), None);
    }

    #[test]
    fn test_tag_registry() {
        let mut tags = MediaTags::default();
        assert!(tags.add(MediaKind::Audio, " podcast "));
        assert!(!tags.add(MediaKind::Audio, "podcast"));
        assert!(!tags.add(MediaKind::Audio, "   "));
        assert_eq!(tags.tags(MediaKind::Audio), ["podcast".to_string()]);
        assert!(tags.tags(MediaKind::Video).is_empty());
        assert!(tags.remove(MediaKind::Audio, "podcast"));
        assert!(!tags.remove(MediaKind::Audio, "podcast"));
    }
}
