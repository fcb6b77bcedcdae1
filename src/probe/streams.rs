//! Stream records and codec-type dispatch
//!
//! The prober reports each stream with a `codec_type` tag. Known tags map to
//! a typed variant of [`StreamRecord`]; anything else (including a missing
//! tag) becomes [`StreamRecord::Generic`]. Building a typed variant from a
//! stream of another codec type is a [`ProbeError::StreamTypeMismatch`].

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domain::errors::ProbeError;
use crate::probe::accessor::{value_as_i64, value_as_string, ParsedJson};

static FRAME_RATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?[0-9]+)/(-?[0-9]+)$").expect("frame rate pattern is valid"));

/// Codec types with a dedicated stream variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Attachment,
    Audio,
    Subtitle,
    Video,
}

impl StreamKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "attachment" => Some(StreamKind::Attachment),
            "audio" => Some(StreamKind::Audio),
            "subtitle" => Some(StreamKind::Subtitle),
            "video" => Some(StreamKind::Video),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StreamKind::Attachment => "attachment",
            StreamKind::Audio => "audio",
            StreamKind::Subtitle => "subtitle",
            StreamKind::Video => "video",
        }
    }
}

/// Fields common to every stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamBase {
    json: ParsedJson,
    pub index: Option<i64>,
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub codec_long_name: Option<String>,
    pub duration_secs: Option<f64>,
}

impl StreamBase {
    fn new(json: ParsedJson) -> Self {
        Self {
            index: json.get_as_int("index"),
            codec_type: json.lookup("codec_type", value_as_string),
            codec_name: json.lookup("codec_name", value_as_string),
            codec_long_name: json.lookup("codec_long_name", value_as_string),
            duration_secs: json.get_as_float("duration"),
            json,
        }
    }

    /// Build the base and require a specific codec type
    fn expecting(
        json: ParsedJson,
        kind: StreamKind,
        variant: &'static str,
    ) -> Result<Self, ProbeError> {
        let base = Self::new(json);
        if base.codec_type.as_deref() != Some(kind.as_str()) {
            return Err(ProbeError::StreamTypeMismatch {
                variant,
                received: base.codec_type,
                required: kind.as_str(),
            });
        }
        Ok(base)
    }

    /// The stream's own JSON object
    pub fn json(&self) -> &ParsedJson {
        &self.json
    }

    /// The `tags` object of the stream, if present
    pub fn tags(&self) -> Option<&serde_json::Map<String, Value>> {
        self.json.get("tags").and_then(Value::as_object)
    }

    fn describe(&self, name: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(streams[{}]: {}({})",
            name,
            display_opt(&self.index),
            display_opt(&self.codec_type),
            display_opt(&self.codec_name)
        )
    }
}

/// A stream whose codec type has no dedicated variant
#[derive(Debug, Clone, PartialEq)]
pub struct GenericStream {
    pub base: StreamBase,
}

impl GenericStream {
    pub fn new(json: ParsedJson) -> Self {
        Self {
            base: StreamBase::new(json),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentStream {
    pub base: StreamBase,
}

impl AttachmentStream {
    pub fn new(json: ParsedJson) -> Result<Self, ProbeError> {
        Ok(Self {
            base: StreamBase::expecting(json, StreamKind::Attachment, "AttachmentStream")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleStream {
    pub base: StreamBase,
}

impl SubtitleStream {
    pub fn new(json: ParsedJson) -> Result<Self, ProbeError> {
        Ok(Self {
            base: StreamBase::expecting(json, StreamKind::Subtitle, "SubtitleStream")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioStream {
    pub base: StreamBase,
    pub num_channels: Option<i64>,
    pub num_frames: Option<i64>,
    pub channel_layout: Option<String>,
    pub sample_rate_hz: Option<i64>,
    pub bit_rate_bps: Option<i64>,
}

impl AudioStream {
    pub fn new(json: ParsedJson) -> Result<Self, ProbeError> {
        let base = StreamBase::expecting(json, StreamKind::Audio, "AudioStream")?;
        let json = base.json();
        Ok(Self {
            num_channels: json.get_as_int("channels"),
            num_frames: json.get_as_int("nb_frames"),
            channel_layout: json.lookup("channel_layout", value_as_string),
            sample_rate_hz: json.get_as_int("sample_rate"),
            bit_rate_bps: json.get_as_int("bit_rate"),
            base,
        })
    }

    pub fn bit_rate_kbps(&self) -> Option<f64> {
        self.bit_rate_bps.map(|bps| bps as f64 / 1000.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoStream {
    pub base: StreamBase,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub num_frames: Option<i64>,
    pub bit_rate_bps: Option<i64>,
}

impl VideoStream {
    pub fn new(json: ParsedJson) -> Result<Self, ProbeError> {
        let base = StreamBase::expecting(json, StreamKind::Video, "VideoStream")?;
        let json = base.json();
        Ok(Self {
            width: json.get_as_int("width"),
            height: json.get_as_int("height"),
            num_frames: json.get_as_int("nb_frames"),
            bit_rate_bps: json.get_as_int("bit_rate"),
            base,
        })
    }

    pub fn bit_rate_kbps(&self) -> Option<f64> {
        self.bit_rate_bps.map(|bps| bps as f64 / 1000.0)
    }

    /// Exact `numerator/denominator` pair of a frame-rate field, unreduced
    pub fn frame_rate_ratio(&self, key: &str) -> Option<(i64, i64)> {
        let raw = self.base.json.get_str(key)?;
        let caps = FRAME_RATE_RE.captures(raw)?;
        let num = caps.get(1)?.as_str().parse::<i64>().ok()?;
        let den = caps.get(2)?.as_str().parse::<i64>().ok()?;
        Some((num, den))
    }

    /// Frame rate in frames per second; non-positive sides are rejected
    pub fn frame_rate(&self, key: &str) -> Option<f64> {
        let (num, den) = self.frame_rate_ratio(key)?;
        if num <= 0 || den <= 0 {
            return None;
        }
        Some(num as f64 / den as f64)
    }

    pub fn avg_frame_rate_ratio(&self) -> Option<(i64, i64)> {
        self.frame_rate_ratio("avg_frame_rate")
    }

    pub fn r_frame_rate_ratio(&self) -> Option<(i64, i64)> {
        self.frame_rate_ratio("r_frame_rate")
    }

    /// Average frame rate over the stream
    pub fn avg_frame_rate(&self) -> Option<f64> {
        self.frame_rate("avg_frame_rate")
    }

    /// Lowest frame rate that represents all timestamps accurately
    pub fn r_frame_rate(&self) -> Option<f64> {
        self.frame_rate("r_frame_rate")
    }

    /// Rotation in degrees of the first side-data entry
    ///
    /// `None` unless every entry carries a `rotation`.
    pub fn frame_rotation(&self) -> Option<i64> {
        let rotations = self
            .base
            .json
            .get("side_data_list")?
            .as_array()?
            .iter()
            .map(|entry| entry.get("rotation"))
            .collect::<Option<Vec<_>>>()?;
        rotations.first().and_then(|rotation| value_as_i64(rotation))
    }

    /// `(width, height)` as displayed, swapped for 90/270 degree rotation
    pub fn frame_shape(&self) -> Option<(i64, i64)> {
        let width = self.width?;
        let height = self.height?;
        match self.frame_rotation().unwrap_or(0).rem_euclid(360) {
            90 | 270 => Some((height, width)),
            _ => Some((width, height)),
        }
    }

    /// Copy of the side-data list; empty when absent
    pub fn side_data(&self) -> Vec<Value> {
        self.base
            .json
            .get("side_data_list")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}

/// One stream of a probe result
#[derive(Debug, Clone, PartialEq)]
pub enum StreamRecord {
    Generic(GenericStream),
    Attachment(AttachmentStream),
    Audio(AudioStream),
    Subtitle(SubtitleStream),
    Video(VideoStream),
}

impl StreamRecord {
    /// Select the variant from the stream's own `codec_type` tag
    pub fn dispatch(json: ParsedJson) -> Result<Self, ProbeError> {
        let kind = json.get_str("codec_type").and_then(StreamKind::from_tag);
        Ok(match kind {
            Some(StreamKind::Attachment) => StreamRecord::Attachment(AttachmentStream::new(json)?),
            Some(StreamKind::Audio) => StreamRecord::Audio(AudioStream::new(json)?),
            Some(StreamKind::Subtitle) => StreamRecord::Subtitle(SubtitleStream::new(json)?),
            Some(StreamKind::Video) => StreamRecord::Video(VideoStream::new(json)?),
            None => StreamRecord::Generic(GenericStream::new(json)),
        })
    }

    pub fn base(&self) -> &StreamBase {
        match self {
            StreamRecord::Generic(s) => &s.base,
            StreamRecord::Attachment(s) => &s.base,
            StreamRecord::Audio(s) => &s.base,
            StreamRecord::Subtitle(s) => &s.base,
            StreamRecord::Video(s) => &s.base,
        }
    }

    /// `None` for generic streams
    pub fn kind(&self) -> Option<StreamKind> {
        match self {
            StreamRecord::Generic(_) => None,
            StreamRecord::Attachment(_) => Some(StreamKind::Attachment),
            StreamRecord::Audio(_) => Some(StreamKind::Audio),
            StreamRecord::Subtitle(_) => Some(StreamKind::Subtitle),
            StreamRecord::Video(_) => Some(StreamKind::Video),
        }
    }

    pub fn as_attachment(&self) -> Option<&AttachmentStream> {
        match self {
            StreamRecord::Attachment(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioStream> {
        match self {
            StreamRecord::Audio(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_subtitle(&self) -> Option<&SubtitleStream> {
        match self {
            StreamRecord::Subtitle(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_video(&self) -> Option<&VideoStream> {
        match self {
            StreamRecord::Video(s) => Some(s),
            _ => None,
        }
    }
}

fn display_opt<T: fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "None".to_string())
}

impl fmt::Display for GenericStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base.describe("GenericStream", f)?;
        f.write_str(")")
    }
}

impl fmt::Display for AttachmentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base.describe("AttachmentStream", f)?;
        f.write_str(")")
    }
}

impl fmt::Display for SubtitleStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base.describe("SubtitleStream", f)?;
        f.write_str(")")
    }
}

impl fmt::Display for AudioStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base.describe("AudioStream", f)?;
        write!(
            f,
            ": {} channels ({}), {} Hz, {} kb/s)",
            display_opt(&self.num_channels),
            display_opt(&self.channel_layout),
            display_opt(&self.sample_rate_hz),
            display_opt(&self.bit_rate_kbps())
        )
    }
}

impl fmt::Display for VideoStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base.describe("VideoStream", f)?;
        write!(
            f,
            ": {}x{}, {} fps, {} kb/s)",
            display_opt(&self.width),
            display_opt(&self.height),
            self.base.json.get_str("avg_frame_rate").unwrap_or("None"),
            display_opt(&self.bit_rate_kbps())
        )
    }
}

impl fmt::Display for StreamRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamRecord::Generic(s) => fmt::Display::fmt(s, f),
            StreamRecord::Attachment(s) => fmt::Display::fmt(s, f),
            StreamRecord::Audio(s) => fmt::Display::fmt(s, f),
            StreamRecord::Subtitle(s) => fmt::Display::fmt(s, f),
            StreamRecord::Video(s) => fmt::Display::fmt(s, f),
        }
    }
}
