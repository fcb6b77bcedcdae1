//! Typed model over the prober's JSON document

use std::fmt;

use serde_json::Value;

use crate::domain::errors::ProbeError;

pub mod accessor;
pub mod format;
pub mod normalizer;
pub mod streams;

pub use accessor::ParsedJson;
pub use format::{ChapterRecord, FormatInfo};
pub use streams::{
    AttachmentStream, AudioStream, GenericStream, StreamKind, StreamRecord, SubtitleStream,
    VideoStream,
};

/// Parsed output of one probe invocation
///
/// The raw top-level document is kept as a [`ParsedJson`]. Its sections
/// are also taken apart once: `format` becomes a [`FormatInfo`], each
/// `streams` entry is dispatched on its `codec_type`, and each `chapters`
/// entry becomes a [`ChapterRecord`]. Per-type views borrow from the master
/// stream list.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    cmdline: Vec<String>,
    json: ParsedJson,
    pub format: FormatInfo,
    pub streams: Vec<StreamRecord>,
    pub chapters: Vec<ChapterRecord>,
}

impl ProbeResult {
    /// Build from the executed command line and its decoded stdout
    ///
    /// The command line must hold at least the program and the target.
    pub fn from_json(cmdline: Vec<String>, document: Value) -> Result<Self, ProbeError> {
        if cmdline.len() < 2 {
            return Err(ProbeError::InvalidArgument {
                name: "cmdline",
                problem: "must hold the program and the media target",
                value: format!("{:?}", cmdline),
            });
        }

        let mut top = match document {
            Value::Object(map) => map,
            other => return Err(ProbeError::not_a_mapping("probe output", &other)),
        };
        let json = ParsedJson::from_map(top.clone());

        let format = match top.remove("format") {
            Some(value) => FormatInfo::new(ParsedJson::new("format", value)?),
            None => FormatInfo::default(),
        };

        let streams = take_list(&mut top, "streams")?
            .into_iter()
            .map(|value| StreamRecord::dispatch(ParsedJson::new("stream", value)?))
            .collect::<Result<Vec<_>, _>>()?;

        let chapters = take_list(&mut top, "chapters")?
            .into_iter()
            .map(|value| Ok(ChapterRecord::new(ParsedJson::new("chapter", value)?)))
            .collect::<Result<Vec<_>, ProbeError>>()?;

        Ok(Self {
            cmdline,
            json,
            format,
            streams,
            chapters,
        })
    }

    pub fn cmdline(&self) -> &[String] {
        &self.cmdline
    }

    /// The decoded prober output as received
    pub fn json(&self) -> &ParsedJson {
        &self.json
    }

    /// Top-level keys of the prober output
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.json.keys()
    }

    /// The executed command line joined for display
    pub fn executed_cmd(&self) -> String {
        self.cmdline.join(" ")
    }

    /// The path or URI that was probed
    pub fn media_target(&self) -> &str {
        self.cmdline.last().map(String::as_str).unwrap_or_default()
    }

    pub fn attachment(&self) -> Vec<&AttachmentStream> {
        self.streams.iter().filter_map(StreamRecord::as_attachment).collect()
    }

    pub fn audio(&self) -> Vec<&AudioStream> {
        self.streams.iter().filter_map(StreamRecord::as_audio).collect()
    }

    pub fn subtitle(&self) -> Vec<&SubtitleStream> {
        self.streams.iter().filter_map(StreamRecord::as_subtitle).collect()
    }

    pub fn video(&self) -> Vec<&VideoStream> {
        self.streams.iter().filter_map(StreamRecord::as_video).collect()
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.format.duration_secs
    }
}

fn take_list(
    top: &mut serde_json::Map<String, Value>,
    key: &'static str,
) -> Result<Vec<Value>, ProbeError> {
    match top.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(ProbeError::InvalidArgument {
            name: key,
            problem: "must be a list",
            value: other.to_string(),
        }),
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let program = self.cmdline.first().map(String::as_str).unwrap_or_default();
        write!(
            f,
            "ProbeResult({} \"{}\" => ({}): {}, {}, {} kb/s, {} streams, {} chapters)",
            program,
            self.media_target(),
            self.format.format_name.as_deref().unwrap_or("None"),
            self.format.duration_human.as_deref().unwrap_or("None"),
            self.format.size_human.as_deref().unwrap_or("None"),
            self.format
                .bit_rate_kbps()
                .map(|k| k.to_string())
                .unwrap_or_else(|| "None".to_string()),
            self.streams.len(),
            self.chapters.len()
        )
    }
}
