use crate::calculate_signature;
use anyhow::Result;
use md5::{Digest, Md5};
use sha1::Sha1;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Who-did-what block carried by some module formats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongCredits {
    pub composer: String,
    pub comment: String,
}

/// Content checksums, computed at most once per song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprints {
    pub md5: String,
    pub sha1: String,
}

/// One playable module file, local or fetched from the archive.
///
/// A `Song` starts as a bare shell (path only) and is filled in by whichever
/// backend ends up accepting it. `backend_name` is non-empty and `is_ready`
/// is true only once resolution has fully succeeded.
#[derive(Debug, Clone, Default)]
pub struct Song {
    pub id: u64,
    pub path: PathBuf,
    pub backend_name: String,
    pub is_ready: bool,
    pub duration: Duration,

    pub title: String,
    pub artist: String,
    pub message: String,
    pub format_name: String,
    pub tracker: String,
    pub module_type: String,
    pub credits: SongCredits,

    pub fingerprints: Option<Fingerprints>,

    /// 0 for songs that never came from the remote archive.
    pub archive_id: u64,
    pub subsong_count: u32,
    pub current_subsong: u32,
}

impl Song {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let id = calculate_signature(&path).unwrap_or_default();

        Song {
            id,
            path,
            ..Default::default()
        }
    }

    pub fn from_archive(archive_id: u64, path: PathBuf) -> Self {
        Song {
            id: archive_id,
            archive_id,
            path,
            ..Default::default()
        }
    }

    pub fn display_title(&self) -> String {
        match self.title.is_empty() {
            true => self
                .path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
            false => self.title.clone(),
        }
    }

    /// Compute MD5/SHA1 over the file contents. Idempotent: once populated,
    /// subsequent calls return without touching the filesystem.
    pub fn ensure_fingerprints(&mut self) -> Result<()> {
        if self.fingerprints.is_some() {
            return Ok(());
        }

        let data = fs::read(&self.path)?;

        let md5 = format!("{:x}", Md5::digest(&data));
        let sha1 = format!("{:x}", Sha1::digest(&data));

        self.fingerprints = Some(Fingerprints { md5, sha1 });
        Ok(())
    }
}
