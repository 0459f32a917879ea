use super::ModuleSourceProvider;
use crate::{
    backend::BackendRegistry,
    domain::{ArchiveSource, Song},
    resolver::Resolver,
};
use anyhow::{anyhow, Result};
use crossbeam_channel::Sender;
use std::{fs, path::PathBuf, sync::Arc, thread};
use tracing::debug;

/// One random-track acquisition, tagged with the configuration generation
/// it was started under. Results from a stale generation are dropped by the
/// controller without any notification.
pub(crate) struct FetchRequest {
    pub generation: u64,
    pub archive_source: ArchiveSource,
    pub member_id: u64,
    pub artist: Option<String>,
    pub dest_dir: PathBuf,
}

pub(crate) struct FetchOutcome {
    pub generation: u64,
    pub result: Result<Song, String>,
}

pub(crate) fn spawn_fetch(
    request: FetchRequest,
    provider: Arc<dyn ModuleSourceProvider>,
    registry: Arc<BackendRegistry>,
    outcomes: Sender<FetchOutcome>,
) {
    thread::spawn(move || {
        let generation = request.generation;
        debug!(generation, "remote fetch started");

        let result = run_fetch(request, provider.as_ref(), &registry).map_err(|e| e.to_string());
        let _ = outcomes.send(FetchOutcome { generation, result });
    });
}

fn run_fetch(
    request: FetchRequest,
    provider: &dyn ModuleSourceProvider,
    registry: &BackendRegistry,
) -> Result<Song> {
    let id = match request.archive_source {
        ArchiveSource::All => provider.fetch_random_id()?,
        ArchiveSource::Favorites => provider.fetch_random_favorite_id(request.member_id)?,
        ArchiveSource::Artist => {
            let artist = request.artist.as_deref().unwrap_or_default();
            provider.fetch_random_artist_id(artist)?
        }
    }
    .ok_or_else(|| anyhow!("archive returned no id"))?;

    fs::create_dir_all(&request.dest_dir)?;

    let path = provider
        .materialize(id, &request.dest_dir)?
        .ok_or_else(|| anyhow!("module {id} could not be materialized"))?;

    let mut song = Song::from_archive(id, path);
    let mut backend = Resolver::resolve(&mut song, registry)?;
    backend.free();

    Ok(song)
}
