use anyhow::Result;
use std::path::{Path, PathBuf};

/// The remote module archive, seen from here as three ways to pick an id
/// and one way to turn an id into a local file.
///
/// Every operation is network-bound and fallible; none of them may be
/// called from the controller's own thread.
pub trait ModuleSourceProvider: Send + Sync {
    fn fetch_random_id(&self) -> Result<Option<u64>>;

    fn fetch_random_favorite_id(&self, member_id: u64) -> Result<Option<u64>>;

    fn fetch_random_artist_id(&self, artist: &str) -> Result<Option<u64>>;

    /// Download the module behind `id` into `dest_dir` and return the local
    /// path, or None when the archive has nothing for that id.
    fn materialize(&self, id: u64, dest_dir: &Path) -> Result<Option<PathBuf>>;
}

/// Provider for running without network access: never has anything.
#[derive(Default)]
pub struct OfflineProvider;

impl ModuleSourceProvider for OfflineProvider {
    fn fetch_random_id(&self) -> Result<Option<u64>> {
        Ok(None)
    }

    fn fetch_random_favorite_id(&self, _member_id: u64) -> Result<Option<u64>> {
        Ok(None)
    }

    fn fetch_random_artist_id(&self, _artist: &str) -> Result<Option<u64>> {
        Ok(None)
    }

    fn materialize(&self, _id: u64, _dest_dir: &Path) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}
