//! Container format and chapter records

use std::fmt;

use serde_json::Value;

use crate::probe::accessor::{value_as_string, ParsedJson};
use crate::utils::SizeBase;

/// The `format` section of a probe result
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormatInfo {
    json: ParsedJson,
    pub format_name: Option<String>,
    pub format_long_name: Option<String>,
    pub duration_secs: Option<f64>,
    pub duration_human: Option<String>,
    pub num_streams: Option<i64>,
    pub bit_rate_bps: Option<i64>,
    pub size_bytes: Option<i64>,
    pub size_human: Option<String>,
}

impl FormatInfo {
    pub fn new(json: ParsedJson) -> Self {
        Self {
            format_name: json.lookup("format_name", value_as_string),
            format_long_name: json.lookup("format_long_name", value_as_string),
            duration_secs: json.get_as_float("duration"),
            duration_human: json.get_duration_as_human(),
            num_streams: json.get_as_int("nb_streams"),
            bit_rate_bps: json.get_as_int("bit_rate"),
            size_bytes: json.get_as_int("size"),
            size_human: json.get_datasize_as_human("size", "B", SizeBase::Decimal),
            json,
        }
    }

    pub fn bit_rate_kbps(&self) -> Option<f64> {
        self.bit_rate_bps.map(|bps| bps as f64 / 1000.0)
    }

    /// The container's own tags, if any
    pub fn tags(&self) -> Option<&serde_json::Map<String, Value>> {
        self.json.get("tags").and_then(Value::as_object)
    }

    pub fn json(&self) -> &ParsedJson {
        &self.json
    }
}

impl fmt::Display for FormatInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FormatInfo(({}): {}, {}, {} kb/s)",
            self.format_name.as_deref().unwrap_or("None"),
            self.duration_human.as_deref().unwrap_or("None"),
            self.size_human.as_deref().unwrap_or("None"),
            self.bit_rate_kbps()
                .map(|k| k.to_string())
                .unwrap_or_else(|| "None".to_string())
        )
    }
}

/// One entry of the `chapters` section
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterRecord {
    json: ParsedJson,
    pub id: Option<i64>,
    pub title: Option<String>,
}

impl ChapterRecord {
    pub fn new(json: ParsedJson) -> Self {
        let title = json
            .get("tags")
            .and_then(|tags| tags.get("title"))
            .and_then(value_as_string);
        Self {
            id: json.get_as_int("id"),
            title,
            json,
        }
    }

    pub fn json(&self) -> &ParsedJson {
        &self.json
    }
}

impl fmt::Display for ChapterRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChapterRecord(chapters[{}]: \"{}\")",
            self.id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "None".to_string()),
            self.title.as_deref().unwrap_or("None")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_fields() {
        let format = FormatInfo::new(
            ParsedJson::new(
                "format",
                json!({
                    "format_name": "flac",
                    "format_long_name": "raw FLAC",
                    "duration": "5751.787000",
                    "nb_streams": 1,
                    "size": "1185288357",
                    "bit_rate": "1648581"
                }),
            )
            .unwrap(),
        );
        assert_eq!(format.format_name.as_deref(), Some("flac"));
        assert_eq!(format.duration_secs, Some(5751.787));
        assert_eq!(format.duration_human.as_deref(), Some("01:35:51.79"));
        assert_eq!(format.num_streams, Some(1));
        assert_eq!(format.size_bytes, Some(1_185_288_357));
        assert_eq!(format.size_human.as_deref(), Some("1.2 GB"));
        assert_eq!(format.bit_rate_kbps(), Some(1648.581));
        assert_eq!(
            format.to_string(),
            "FormatInfo((flac): 01:35:51.79, 1.2 GB, 1648.581 kb/s)"
        );
    }

    #[test]
    fn test_empty_format_defaults_to_none() {
        let format = FormatInfo::new(ParsedJson::default());
        assert_eq!(format.format_name, None);
        assert_eq!(format.duration_human, None);
        assert_eq!(format.size_human, None);
        assert_eq!(format.bit_rate_kbps(), None);
    }

    #[test]
    fn test_chapter_title_is_optional() {
        let titled = ChapterRecord::new(
            ParsedJson::new("chapter", json!({"id": 0, "tags": {"title": "Intro"}})).unwrap(),
        );
        let untitled = ChapterRecord::new(ParsedJson::new("chapter", json!({"id": 1})).unwrap());
        assert_eq!(titled.id, Some(0));
        assert_eq!(titled.title.as_deref(), Some("Intro"));
        assert_eq!(untitled.title, None);
        assert_eq!(titled.to_string(), "ChapterRecord(chapters[0]: \"Intro\")");
    }
}
