//! Video gallery metadata as published in `data/videos.json`.

use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct VideoItem {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub duration: Option<String>,
    pub thumbnail: String,
}

impl VideoItem {
    /// "2023 · 12:41" style line under the video title.
    pub fn meta_line(&self) -> String {
        match (self.year, self.duration.as_deref()) {
            (Some(year), Some(duration)) => format!("{year} · {duration}"),
            (Some(year), None) => year.to_string(),
            (None, Some(duration)) => duration.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// Privacy-enhanced embed URL used when a placeholder is activated.
pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube-nocookie.com/embed/{video_id}?autoplay=1&rel=0&modestbranding=1")
}
