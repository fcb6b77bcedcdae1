//! Flattens a probe result into track metadata

use std::path::Path;

use serde_json::{Map, Value};

use crate::domain::errors::NormalizeError;
use crate::domain::model::{Isrc, TrackMetadata};
use crate::domain::rules::year_from_date;
use crate::probe::accessor::value_as_string;
use crate::probe::ProbeResult;

/// Read artist, title, album artist, year and ISRC from the first audio stream
///
/// Only the first audio stream is consulted; if it has no `tags` object the
/// file is rejected even when a later audio stream carries tags.
pub fn normalize(result: &ProbeResult, file_path: &Path) -> Result<TrackMetadata, NormalizeError> {
    let audio = result
        .audio()
        .into_iter()
        .next()
        .ok_or(NormalizeError::NoAudioStream)?;

    let tags = audio.base.tags().ok_or(NormalizeError::MissingTags {
        index: audio.base.index,
    })?;

    let text = |key: &str| tag(tags, key).unwrap_or_default();

    Ok(TrackMetadata {
        artist: text("ARTIST"),
        title: text("TITLE"),
        year: tag(tags, "DATE")
            .map(|date| year_from_date(&date))
            .unwrap_or_default(),
        album_artist: text("album_artist"),
        isrc: tag(tags, "ISRC").and_then(|raw| Isrc::parse(&raw)),
        file_path: file_path.to_path_buf(),
    })
}

/// Case-insensitive tag lookup; an exact key match wins
fn tag(tags: &Map<String, Value>, key: &str) -> Option<String> {
    tags.get(key)
        .or_else(|| {
            tags.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
        .and_then(value_as_string)
}
