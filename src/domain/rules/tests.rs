// Unit tests for business rules

use super::*;
use serde_json::json;
use std::path::PathBuf;

fn record(explicit: &str) -> CatalogRecord {
    CatalogRecord::from_json(json!({
        "duration": "PT3M12S",
        "recordingVersion": "",
        "isValidIsrc": "True",
        "recordingYear": "2017",
        "recordingArtistName": "Artist",
        "isExplicit": explicit,
        "isrc": "CAUM81700077",
        "isrcFailureCode": "",
        "recordingTitle": "Song",
        "id": "1"
    }))
    .unwrap()
}

#[test]
fn test_substring_mode_matches_anywhere_in_name() {
    let matcher = ExtensionMatcher::default();
    assert!(matcher.matches(&PathBuf::from("/music/a/song.flac")));
    assert!(matcher.matches(&PathBuf::from("/music/a/song.opus")));
    assert!(matcher.matches(&PathBuf::from("song.mp3")));
    assert!(matcher.matches(&PathBuf::from("foo.mp3.txt")));
    assert!(!matcher.matches(&PathBuf::from("cover.jpg")));
    assert!(!matcher.matches(&PathBuf::from("SONG.FLAC")));
}

#[test]
fn test_substring_mode_ignores_directory_names() {
    let matcher = ExtensionMatcher::default();
    assert!(!matcher.matches(&PathBuf::from("/music/album.flac/notes.txt")));
}

#[test]
fn test_suffix_mode_requires_extension_at_end() {
    let matcher = ExtensionMatcher::new(default_extensions(), MatchMode::Suffix);
    assert!(matcher.matches(&PathBuf::from("song.mp3")));
    assert!(matcher.matches(&PathBuf::from("SONG.FLAC")));
    assert!(!matcher.matches(&PathBuf::from("foo.mp3.txt")));
}

#[test]
fn test_year_from_date() {
    assert_eq!(year_from_date("2020"), "2020");
    assert_eq!(year_from_date("2020-05-01"), "2020");
    assert_eq!(year_from_date(" 1999 "), "1999");
    assert_eq!(year_from_date("20201"), "20201");
    assert_eq!(year_from_date("May 2020"), "May 2020");
    assert_eq!(year_from_date(""), "");
}

#[test]
fn test_explicit_decision_short_circuits_explicit_records() {
    assert_eq!(
        ExplicitDecision::for_record(&record("True")),
        ExplicitDecision::AlreadyExplicit
    );
}

#[test]
fn test_explicit_decision_searches_for_clean_records() {
    match ExplicitDecision::for_record(&record("False")) {
        ExplicitDecision::SearchRequired(search) => {
            assert_eq!(search.artist, "Artist");
            assert_eq!(search.title, "Song");
            assert_eq!(search.year, "2017");
        }
        other => panic!("unexpected decision: {:?}", other),
    }
}

#[test]
fn test_any_explicit() {
    let recs = vec![
        json!({"isExplicit": "False"}),
        json!({"isExplicit": "True"}),
    ];
    assert!(any_explicit(&recs));
    assert!(!any_explicit(&recs[..1]));
    assert!(!any_explicit(&[json!({"title": "no flag"})]));
    assert!(!any_explicit(&[json!({"isExplicit": "true"})]));
    assert!(!any_explicit(&[]));
}
