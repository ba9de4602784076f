//! Export writers
//!
//! Flattens playlist tracks into records and writes them as JSON or
//! CSV. Records keep the API's camelCase field names so exported JSON
//! matches what the API returns.

use std::path::Path;

use anyhow::Context;
use musickit_api::Track;
use serde::Serialize;
use tracing::info;

/// Default export locations, relative to the working directory.
pub const DEFAULT_JSON_OUTPUT: &str = "output/songs.json";
pub const DEFAULT_CSV_OUTPUT: &str = "output/songs.csv";

const CSV_HEADER: [&str; 5] = ["name", "artistName", "albumName", "genreNames", "releaseDate"];

/// One exported song row.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SongRecord {
    pub name: String,
    pub artist_name: String,
    pub album_name: String,
    pub genre_names: Vec<String>,
    pub release_date: String,
}

/// Flatten tracks into export records. Tracks without attributes are
/// skipped; missing individual fields become empty strings.
pub fn song_records(tracks: &[Track]) -> Vec<SongRecord> {
    tracks
        .iter()
        .filter_map(|track| {
            let attrs = track.attributes.as_ref()?;
            Some(SongRecord {
                name: attrs.name.clone().unwrap_or_default(),
                artist_name: attrs.artist_name.clone().unwrap_or_default(),
                album_name: attrs.album_name.clone().unwrap_or_default(),
                genre_names: attrs.genre_names.clone(),
                release_date: attrs.release_date.clone().unwrap_or_default(),
            })
        })
        .collect()
}

/// Write records as a pretty-printed JSON array.
pub fn write_json(records: &[SongRecord], path: &Path) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(songs = records.len(), path = %path.display(), "wrote JSON export");
    Ok(())
}

/// Write records as CSV, genres joined with "; " in a single column.
pub fn write_csv(records: &[SongRecord], path: &Path) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("writing {}", path.display()))?;
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record([
            record.name.as_str(),
            record.artist_name.as_str(),
            record.album_name.as_str(),
            &record.genre_names.join("; "),
            record.release_date.as_str(),
        ])?;
    }
    writer.flush()?;
    info!(songs = records.len(), path = %path.display(), "wrote CSV export");
    Ok(())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use musickit_api::TrackAttributes;

    fn sample_tracks() -> Vec<Track> {
        vec![
            Track {
                id: "t.1".into(),
                attributes: Some(TrackAttributes {
                    name: Some("Thunder Road".into()),
                    artist_name: Some("Bruce Springsteen".into()),
                    album_name: Some("Born to Run".into()),
                    genre_names: vec!["Rock".into(), "Classic Rock".into()],
                    release_date: Some("1975-08-25".into()),
                }),
            },
            // No attributes at all: skipped entirely.
            Track {
                id: "t.2".into(),
                attributes: None,
            },
            Track {
                id: "t.3".into(),
                attributes: Some(TrackAttributes {
                    name: Some("Untitled".into()),
                    artist_name: None,
                    album_name: None,
                    genre_names: vec![],
                    release_date: None,
                }),
            },
        ]
    }

    #[test]
    fn records_skip_attributeless_tracks_and_default_missing_fields() {
        let records = song_records(&sample_tracks());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Thunder Road");
        assert_eq!(records[1].artist_name, "");
        assert_eq!(records[1].release_date, "");
    }

    #[test]
    fn json_export_uses_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.json");
        write_json(&song_records(&sample_tracks()), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value[0]["artistName"], "Bruce Springsteen");
        assert_eq!(value[0]["genreNames"][1], "Classic Rock");
    }

    #[test]
    fn csv_export_joins_genres_in_one_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.csv");
        write_csv(&song_records(&sample_tracks()), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "name,artistName,albumName,genreNames,releaseDate"
        );
        let first = lines.next().unwrap();
        assert!(first.contains("Rock; Classic Rock"), "got: {first}");
    }

    #[test]
    fn writers_create_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out").join("songs.json");
        write_json(&[], &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }
}
