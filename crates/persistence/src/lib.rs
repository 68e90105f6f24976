#![deny(warnings)]

//! League save files.
//!
//! A save is a full [`LeagueState`] snapshot, written as pretty JSON or as
//! compact bincode. Loading always runs [`validate_league`], so a corrupt or
//! hand-edited save is rejected at the boundary instead of surfacing later
//! as a broken invariant.

use std::fs;
use std::path::Path;

use gm_core::{validate_league, LeagueState, ValidationError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("invalid save: {0}")]
    Invalid(#[from] ValidationError),
    #[error("unrecognized save file extension: {0:?}")]
    UnknownFormat(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    Json,
    Bincode,
}

impl SaveFormat {
    /// `.json` saves are JSON; `.bin` and `.sav` are bincode.
    pub fn from_path(path: &Path) -> Result<Self, PersistError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(SaveFormat::Json),
            "bin" | "sav" => Ok(SaveFormat::Bincode),
            _ => Err(PersistError::UnknownFormat(ext)),
        }
    }
}

pub fn to_bytes(state: &LeagueState, format: SaveFormat) -> Result<Vec<u8>, PersistError> {
    Ok(match format {
        SaveFormat::Json => serde_json::to_vec_pretty(state)?,
        SaveFormat::Bincode => bincode::serialize(state)?,
    })
}

/// Decodes and validates a save.
pub fn from_bytes(bytes: &[u8], format: SaveFormat) -> Result<LeagueState, PersistError> {
    let state: LeagueState = match format {
        SaveFormat::Json => serde_json::from_slice(bytes)?,
        SaveFormat::Bincode => bincode::deserialize(bytes)?,
    };
    validate_league(&state)?;
    Ok(state)
}

/// Writes `state` to `path`, picking the format from the extension and
/// creating missing parent directories.
pub fn save(path: &Path, state: &LeagueState) -> Result<(), PersistError> {
    let format = SaveFormat::from_path(path)?;
    let bytes = to_bytes(state, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &bytes)?;
    info!(path = %path.display(), ?format, bytes = bytes.len(), "league saved");
    Ok(())
}

pub fn load(path: &Path) -> Result<LeagueState, PersistError> {
    let format = SaveFormat::from_path(path)?;
    let bytes = fs::read(path)?;
    let state = from_bytes(&bytes, format)?;
    info!(path = %path.display(), season = state.season, "league loaded");
    Ok(state)
}
