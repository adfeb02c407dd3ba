// Track file adapter - Read and write track metadata as JSON or YAML

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};

use crate::domain::model::{Track, TrackId};
use crate::error::{AlignError, AlignResult};

/// Serialization format of a track file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackFormat {
    Json,
    Yaml,
}

impl TrackFormat {
    /// Pick the format from a file extension (JSON unless `.yaml`/`.yml`)
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => TrackFormat::Yaml,
            _ => TrackFormat::Json,
        }
    }
}

/// Load a list of tracks keyed by id
pub fn load_tracks(path: &Path) -> AlignResult<BTreeMap<TrackId, Track>> {
    if !path.exists() {
        return Err(AlignError::validation(format!(
            "Track file does not exist: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let tracks = parse_tracks(&content, TrackFormat::from_path(path))?;
    info!("Loaded {} tracks from {}", tracks.len(), path.display());
    Ok(tracks)
}

/// Parse a list of tracks; duplicate ids and unknown kinds are rejected
pub fn parse_tracks(content: &str, format: TrackFormat) -> AlignResult<BTreeMap<TrackId, Track>> {
    let list: Vec<Track> = match format {
        TrackFormat::Json => serde_json::from_str(content)
            .map_err(|e| AlignError::validation(format!("Malformed track list: {}", e)))?,
        TrackFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| AlignError::validation(format!("Malformed track list: {}", e)))?,
    };

    let mut tracks = BTreeMap::new();
    for track in list {
        debug!("Track '{}' ({}, {:.3}s)", track.id, track.kind, track.duration);
        if let Some(previous) = tracks.insert(track.id.clone(), track) {
            return Err(AlignError::validation(format!(
                "Duplicate track id '{}'",
                previous.id
            )));
        }
    }
    Ok(tracks)
}

/// Write tracks as a list in the format implied by `path`
pub fn write_tracks<'a, I>(path: &Path, tracks: I) -> AlignResult<()>
where
    I: IntoIterator<Item = &'a Track>,
{
    let list: Vec<&Track> = tracks.into_iter().collect();
    let content = match TrackFormat::from_path(path) {
        TrackFormat::Json => serde_json::to_string_pretty(&list)?,
        TrackFormat::Yaml => serde_yaml::to_string(&list)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    info!("Wrote {} tracks to {}", list.len(), path.display());
    Ok(())
}
