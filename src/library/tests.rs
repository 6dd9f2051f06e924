use super::display::{format_time, parse_time, resolve_duration};
use super::load::record_from_metadata;
use super::*;
use crate::config::{AccessPolicy, AccessSettings, CatalogSettings};
use crate::error::{CatalogLoadError, FetchError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::time::Duration;

fn song(id: u32, genres: &[&str]) -> SongRecord {
    SongRecord {
        id: SongId(id),
        filename: format!("{id}.mp3"),
        title: format!("Song {id}"),
        artist: None,
        duration: None,
        display_duration: UNKNOWN_DURATION.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        protection: Protection::Sealed {
            salt: [0; SALT_LEN],
            iv: [0; IV_LEN],
            iterations: 1,
        },
    }
}

fn scenario() -> Library {
    Library::new(vec![
        song(1, &["rock"]),
        song(2, &["jazz"]),
        song(3, &["rock", "jazz"]),
    ])
}

fn ids(view: Vec<&SongRecord>) -> Vec<u32> {
    view.into_iter().map(|s| s.id.0).collect()
}

fn sealed_json(filename: &str, title: &str, genres: &[&str]) -> String {
    serde_json::json!({
        "filename": filename,
        "title": title,
        "artist": "Luna Echo",
        "duration": "3:45",
        "genres": genres,
        "salt": STANDARD.encode([7u8; SALT_LEN]),
        "iv": STANDARD.encode([9u8; IV_LEN]),
        "encrypted_at": "2025-01-01T00:00:00Z",
    })
    .to_string()
}

#[test]
fn filter_scenario_uses_or_semantics() {
    let lib = scenario();
    assert_eq!(ids(lib.filter(&FilterSet::from_genres(["rock"]))), vec![1, 3]);
    assert_eq!(ids(lib.filter(&FilterSet::from_genres(["jazz"]))), vec![2, 3]);
    assert_eq!(
        ids(lib.filter(&FilterSet::from_genres(["rock", "jazz"]))),
        vec![1, 2, 3]
    );
    assert_eq!(ids(lib.filter(&FilterSet::new())), vec![1, 2, 3]);
}

#[test]
fn filter_with_unknown_genre_is_empty_and_leaves_library_intact() {
    let lib = scenario();
    assert!(lib.filter(&FilterSet::from_genres(["polka"])).is_empty());
    assert_eq!(lib.len(), 3);
}

#[test]
fn untagged_songs_only_show_without_filter() {
    let lib = Library::new(vec![song(1, &[]), song(2, &["rock"])]);
    assert_eq!(lib.filtered_ids(&FilterSet::new()), vec![SongId(1), SongId(2)]);
    assert_eq!(
        lib.filtered_ids(&FilterSet::from_genres(["rock"])),
        vec![SongId(2)]
    );
}

#[test]
fn filter_set_toggle_behaves_like_a_checkbox() {
    let mut f = FilterSet::new();
    assert!(f.toggle("rock"));
    assert!(f.contains("rock"));
    assert!(!f.toggle("rock"));
    assert!(f.is_empty());
    assert!(!f.select("  "));
    assert!(f.select(" jazz "));
    assert!(f.contains("jazz"));
}

#[test]
fn genres_are_sorted_and_unique() {
    assert_eq!(scenario().genres(), vec!["jazz", "rock"]);
}

#[test]
fn navigation_wraps_around_the_view() {
    let view = vec![SongId(1), SongId(2), SongId(3)];
    assert_eq!(next_in_view(&view, Some(SongId(3))), Some(SongId(1)));
    assert_eq!(prev_in_view(&view, Some(SongId(1))), Some(SongId(3)));
    assert_eq!(next_in_view(&view, Some(SongId(1))), Some(SongId(2)));
    assert_eq!(prev_in_view(&view, Some(SongId(3))), Some(SongId(2)));
}

#[test]
fn navigation_on_single_item_view_stays_put() {
    let view = vec![SongId(5)];
    assert_eq!(next_in_view(&view, Some(SongId(5))), Some(SongId(5)));
    assert_eq!(prev_in_view(&view, Some(SongId(5))), Some(SongId(5)));
}

#[test]
fn navigation_from_outside_the_view_lands_on_an_edge() {
    let view = vec![SongId(1), SongId(2)];
    assert_eq!(next_in_view(&view, Some(SongId(9))), Some(SongId(1)));
    assert_eq!(prev_in_view(&view, None), Some(SongId(2)));
    assert_eq!(next_in_view(&[], Some(SongId(1))), None);
    assert_eq!(prev_in_view(&[], None), None);
}

#[test]
fn song_id_is_stable_per_filename() {
    assert_eq!(SongId::from_filename("a.mp3"), SongId::from_filename("a.mp3"));
    assert_ne!(SongId::from_filename("a.mp3"), SongId::from_filename("b.mp3"));
}

#[test]
fn time_parsing_and_formatting() {
    assert_eq!(parse_time("3:45"), Some(Duration::from_secs(225)));
    assert_eq!(parse_time("1:02:03"), Some(Duration::from_secs(3723)));
    assert_eq!(parse_time("90"), Some(Duration::from_secs(90)));
    assert_eq!(parse_time("3:75"), None);
    assert_eq!(parse_time("abc"), None);
    assert_eq!(format_time(Duration::from_secs(225)), "3:45");
    assert_eq!(format_time(Duration::from_secs(5)), "0:05");
    assert_eq!(format_time(Duration::from_secs(3723)), "1:02:03");
}

#[test]
fn resolve_duration_accepts_seconds_or_text() {
    assert_eq!(
        resolve_duration(Some(&DisplayDuration::Seconds(252))),
        (Some(Duration::from_secs(252)), "4:12".to_string())
    );
    assert_eq!(
        resolve_duration(Some(&DisplayDuration::Text("about four minutes".into()))),
        (None, "about four minutes".to_string())
    );
    assert_eq!(resolve_duration(None), (None, UNKNOWN_DURATION.to_string()));
}

#[test]
fn sealed_record_decodes_salt_iv_and_defaults_iterations() {
    let meta: SongMetadata =
        serde_json::from_str(&sealed_json("a.mp3", " Midnight Dreams ", &["rock", " rock", ""]))
            .unwrap();
    let access = AccessSettings {
        policy: AccessPolicy::DeriveAndDecrypt,
        default_iterations: 4321,
    };
    let r = record_from_metadata("a.mp3.json", "a.mp3", meta, &access).unwrap();

    assert_eq!(r.id, SongId::from_filename("a.mp3"));
    assert_eq!(r.title, "Midnight Dreams");
    assert_eq!(r.artist.as_deref(), Some("Luna Echo"));
    assert_eq!(r.genres, vec!["rock".to_string()]);
    assert_eq!(r.duration, Some(Duration::from_secs(225)));
    assert_eq!(
        r.protection,
        Protection::Sealed {
            salt: [7; SALT_LEN],
            iv: [9; IV_LEN],
            iterations: 4321,
        }
    );
}

#[test]
fn sealed_record_rejects_wrong_length_iv() {
    let mut meta: SongMetadata = serde_json::from_str(&sealed_json("a.mp3", "A", &[])).unwrap();
    meta.iv = Some(STANDARD.encode([1u8; 16]));
    let err = record_from_metadata("a.mp3.json", "a.mp3", meta, &AccessSettings::default())
        .unwrap_err();
    assert!(matches!(err, CatalogLoadError::InvalidField { field: "iv", .. }));
}

#[test]
fn legacy_record_reads_camel_case_fields() {
    let meta: SongMetadata = serde_json::from_str(
        r#"{
            "filename": "midnight.wav",
            "title": "Midnight Dreams",
            "duration": "3:45",
            "passwordHash": "000000000000000000000000324be1ed",
            "audioUrl": "data:audio/wav;base64,UklGRg=="
        }"#,
    )
    .unwrap();
    let access = AccessSettings {
        policy: AccessPolicy::HashCompare,
        ..AccessSettings::default()
    };
    let r = record_from_metadata("midnight.wav.json", "midnight.wav", meta, &access).unwrap();
    assert!(r.genres.is_empty());
    assert_eq!(
        r.protection,
        Protection::Fingerprint {
            hash: "000000000000000000000000324be1ed".to_string(),
            audio_url: "data:audio/wav;base64,UklGRg==".to_string(),
        }
    );
}

#[test]
fn legacy_record_without_hash_is_rejected() {
    let meta: SongMetadata =
        serde_json::from_str(r#"{"filename": "x.mp3", "title": "X"}"#).unwrap();
    let access = AccessSettings {
        policy: AccessPolicy::HashCompare,
        ..AccessSettings::default()
    };
    let err = record_from_metadata("x.mp3.json", "x.mp3", meta, &access).unwrap_err();
    assert!(matches!(
        err,
        CatalogLoadError::InvalidField {
            field: "password_hash",
            ..
        }
    ));
}

#[test]
fn load_library_skips_broken_records_and_keeps_manifest_order() {
    let source = MemorySource::new()
        .with("manifest.json", r#"{"songs": ["b.mp3", "missing.mp3", "bad.mp3", "a.mp3"]}"#)
        .with("b.mp3.json", sealed_json("b.mp3", "Bee", &["jazz"]))
        .with("bad.mp3.json", "{ not json")
        .with("a.mp3.json", sealed_json("a.mp3", "Ay", &["rock"]));

    let out = load_library(&source, &CatalogSettings::default(), &AccessSettings::default())
        .unwrap();

    let titles: Vec<&str> = out.library.songs().iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Bee", "Ay"]);
    assert_eq!(out.skipped.len(), 2);
    assert!(matches!(out.skipped[0], CatalogLoadError::Fetch { .. }));
    assert!(matches!(out.skipped[1], CatalogLoadError::Parse { .. }));
}

#[test]
fn load_library_skips_duplicate_filenames() {
    let source = MemorySource::new()
        .with("manifest.json", r#"["a.mp3", "a.mp3"]"#)
        .with("a.mp3.json", sealed_json("a.mp3", "Ay", &[]));

    let out = load_library(&source, &CatalogSettings::default(), &AccessSettings::default())
        .unwrap();
    assert_eq!(out.library.len(), 1);
    assert!(matches!(out.skipped[0], CatalogLoadError::DuplicateId { .. }));
}

#[test]
fn load_library_fails_without_manifest() {
    let err = load_library(
        &MemorySource::new(),
        &CatalogSettings::default(),
        &AccessSettings::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CatalogLoadError::Fetch {
            source: FetchError::NotFound(_),
            ..
        }
    ));
}

#[test]
fn directory_source_reads_files_and_refuses_escapes() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("manifest.json"), br#"["a.mp3"]"#).unwrap();
    std::fs::write(dir.path().join("a.mp3.json"), sealed_json("a.mp3", "Ay", &[])).unwrap();

    let source = DirectorySource::new(dir.path());
    assert_eq!(source.fetch("manifest.json").unwrap(), br#"["a.mp3"]"#.to_vec());
    assert!(matches!(
        source.fetch("../etc/passwd"),
        Err(FetchError::NotFound(_))
    ));
    assert!(matches!(source.fetch("nope.json"), Err(FetchError::NotFound(_))));

    let out = load_library(&source, &CatalogSettings::default(), &AccessSettings::default())
        .unwrap();
    assert_eq!(out.library.len(), 1);
    assert!(out.skipped.is_empty());
}
