use anyhow::{anyhow, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, UNIX_EPOCH},
};
use xxhash_rust::xxh3::xxh3_64;

pub mod app_core;
pub mod backend;
pub mod controller;
pub mod domain;
pub mod player;
pub mod queue;
pub mod resolver;
pub mod settings;

pub use backend::{BackendRegistry, DecoderBackend};
pub use controller::{ModuleSourceProvider, Notification, PlaybackController};
pub use domain::{PlayingConfiguration, Song};
pub use player::{AudioSink, AudioSinkFactory};
pub use settings::PlayerSettings;

/// Create a hash based on...
///  - date of last modification (millis)
///  - file size (bytes)
///  - path as str as bytes
pub fn calculate_signature<P: AsRef<Path>>(path: P) -> Result<u64> {
    let metadata = fs::metadata(&path)?;

    let last_mod = metadata.modified()?.duration_since(UNIX_EPOCH)?.as_millis() as i64;
    let size = metadata.len();

    let mut data = Vec::with_capacity(path.as_ref().as_os_str().len() + 16);

    data.extend_from_slice(path.as_ref().as_os_str().as_encoded_bytes());
    data.extend_from_slice(&last_mod.to_le_bytes());
    data.extend_from_slice(&size.to_le_bytes());

    Ok(xxh3_64(&data))
}

pub enum DurationStyle {
    Clean,
    Compact,
}

pub fn get_readable_duration(duration: Duration, style: DurationStyle) -> String {
    let mut secs = duration.as_secs();
    let mins = secs / 60;
    secs %= 60;

    match style {
        DurationStyle::Clean => match mins {
            0 => format!("{secs:02}s"),
            _ => format!("{mins}m {secs:02}s"),
        },
        DurationStyle::Compact => format!("{mins}:{secs:02}"),
    }
}

pub fn expand_tilde<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    if !path_str.starts_with('~') {
        return Ok(path.to_path_buf());
    }

    if path_str == "~" {
        return Err(anyhow!(
            "Setting the home directory would read every file in your system. Please provide a more specific path!"
        ));
    }

    if path_str.starts_with("~/") || path_str.starts_with("~\\") {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory!"))?;
        return Ok(home.join(&path_str[2..]));
    }

    Err(anyhow!("Error reading directory with tilde (~)"))
}
