//! Track metadata as published in `data/tracks.json`.
//!
//! Decoding is deliberately lenient: optional fields may be missing and
//! malformed insight sections degrade to empty rather than failing the
//! whole document, so one bad record never blanks the player.

use serde::{Deserialize, Deserializer};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Track {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub year: Option<u32>,
    pub cover: String,
    pub audio: String,
    #[serde(default)]
    pub insight: Option<Insight>,
}

impl Track {
    /// Secondary line under the hero title.
    pub fn byline(&self) -> String {
        match self.year {
            Some(year) => format!("{year} · Studio production"),
            None => "Original track".to_string(),
        }
    }

    /// Short summary shown on the track card.
    pub fn card_summary(&self) -> String {
        match self.year {
            Some(year) => format!("{year} · {}", self.description),
            None => self.description.clone(),
        }
    }

    pub fn insight(&self) -> Option<&Insight> {
        self.insight.as_ref().filter(|insight| !insight.is_empty())
    }
}

/// Production notes attached to a track, all sections optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Insight {
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub steps: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub gear: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub media: Vec<String>,
}

impl Insight {
    pub fn is_empty(&self) -> bool {
        self.notes.as_deref().map_or(true, |notes| notes.is_empty())
            && self.steps.is_empty()
            && self.gear.is_empty()
            && self.media.is_empty()
    }
}

// Accepts anything where a string array is expected: non-arrays become
// empty and non-string entries are skipped.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(text) => Some(text),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
