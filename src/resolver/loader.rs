use super::Resolver;
use crate::{backend::BackendRegistry, domain::Song};
use crossbeam_channel::Sender;
use rayon::prelude::*;
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
};
use tracing::{info, warn};

pub enum LoaderEvent {
    /// A backend accepted the file; metadata is still on its way.
    SongLoaded(Song),
    /// Metadata and fingerprints are in; the song is fully resolved.
    SongInfoRetrieved(Song),
    SongFailed { path: PathBuf, error: String },
    /// Fired exactly once per batch, when every path has reported back.
    AllSongsLoaded { loaded: usize, total: usize },
}

/// Resolves many candidate files against the registry on a bounded pool.
///
/// Per-song events arrive in completion order, not submission order. The
/// single-thread variant trades that parallelism for strict file-list order
/// (playlist construction wants it).
pub struct BulkLoader {
    registry: Arc<BackendRegistry>,
    concurrency: usize,
}

impl BulkLoader {
    pub const DEFAULT_CONCURRENCY: usize = 10;

    pub fn new(registry: Arc<BackendRegistry>, concurrency: usize) -> Self {
        BulkLoader {
            registry,
            concurrency: concurrency.max(1),
        }
    }

    pub fn sequential(registry: Arc<BackendRegistry>) -> Self {
        Self::new(registry, 1)
    }

    /// Dispatch the batch and return immediately. Completion bookkeeping
    /// lives on the worker side: every path reports exactly once, success
    /// or not, and the final count triggers the single `AllSongsLoaded`.
    pub fn load(&self, paths: Vec<PathBuf>, events: Sender<LoaderEvent>) {
        let total = paths.len();
        if total == 0 {
            let _ = events.send(LoaderEvent::AllSongsLoaded { loaded: 0, total: 0 });
            return;
        }

        let registry = Arc::clone(&self.registry);
        let concurrency = self.concurrency;
        let completed = Arc::new(AtomicUsize::new(0));
        let succeeded = Arc::new(AtomicUsize::new(0));

        thread::spawn(move || {
            info!(total, concurrency, "bulk load started");

            if concurrency == 1 {
                for path in paths {
                    Self::load_one(path, &registry, &events, &completed, &succeeded, total);
                }
                return;
            }

            let pool = match rayon::ThreadPoolBuilder::new()
                .num_threads(concurrency)
                .build()
            {
                Ok(pool) => pool,
                Err(e) => {
                    warn!("could not build loader pool, falling back to sequential: {e}");
                    for path in paths {
                        Self::load_one(path, &registry, &events, &completed, &succeeded, total);
                    }
                    return;
                }
            };

            pool.install(|| {
                paths.into_par_iter().for_each(|path| {
                    Self::load_one(path, &registry, &events, &completed, &succeeded, total);
                });
            });
        });
    }

    fn load_one(
        path: PathBuf,
        registry: &BackendRegistry,
        events: &Sender<LoaderEvent>,
        completed: &AtomicUsize,
        succeeded: &AtomicUsize,
        total: usize,
    ) {
        let mut song = Song::from_path(&path);

        match Resolver::assign_backend(&song, registry) {
            Ok((name, mut backend)) => {
                let _ = events.send(LoaderEvent::SongLoaded(song.clone()));

                match Resolver::extract_info(&mut song, backend.as_mut()) {
                    Ok(()) => {
                        song.backend_name = name;
                        song.is_ready = true;
                        succeeded.fetch_add(1, Ordering::SeqCst);
                        let _ = events.send(LoaderEvent::SongInfoRetrieved(song));
                    }
                    Err(e) => {
                        warn!(path = %path.display(), "metadata extraction failed: {e}");
                        let _ = events.send(LoaderEvent::SongFailed {
                            path,
                            error: e.to_string(),
                        });
                    }
                }

                backend.free();
            }
            Err(e) => {
                warn!(path = %path.display(), "no backend accepted file: {e}");
                let _ = events.send(LoaderEvent::SongFailed {
                    path,
                    error: e.to_string(),
                });
            }
        }

        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
        if done == total {
            let _ = events.send(LoaderEvent::AllSongsLoaded {
                loaded: succeeded.load(Ordering::SeqCst),
                total,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::test_support::FakeBackend;
    use crossbeam_channel::unbounded;
    use std::time::Duration;
    use tempfile::TempDir;

    fn fixture_paths(dir: &TempDir, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.path().join(format!("track_{i:02}.mod"));
                std::fs::write(&path, format!("module {i}")).unwrap();
                path
            })
            .collect()
    }

    fn registry_accepting_all() -> Arc<BackendRegistry> {
        let mut registry = BackendRegistry::new();
        registry.register("fake", || Box::new(FakeBackend::new(true)));
        Arc::new(registry)
    }

    fn drain_batch(rx: &crossbeam_channel::Receiver<LoaderEvent>) -> Vec<LoaderEvent> {
        let mut events = Vec::new();
        loop {
            match rx.recv_timeout(Duration::from_secs(5)) {
                Ok(event) => {
                    let last = matches!(event, LoaderEvent::AllSongsLoaded { .. });
                    events.push(event);
                    if last {
                        return events;
                    }
                }
                Err(_) => panic!("batch never completed"),
            }
        }
    }

    #[test]
    fn batch_fires_all_done_exactly_once() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir, 8);
        let (tx, rx) = unbounded();

        BulkLoader::new(registry_accepting_all(), 4).load(paths, tx);
        let events = drain_batch(&rx);

        let loaded = events
            .iter()
            .filter(|e| matches!(e, LoaderEvent::SongLoaded(_)))
            .count();
        let infos = events
            .iter()
            .filter(|e| matches!(e, LoaderEvent::SongInfoRetrieved(_)))
            .count();

        assert_eq!(loaded, 8);
        assert_eq!(infos, 8);

        match events.last() {
            Some(LoaderEvent::AllSongsLoaded { loaded, total }) => {
                assert_eq!(*loaded, 8);
                assert_eq!(*total, 8);
            }
            _ => panic!("expected AllSongsLoaded last"),
        }

        // Nothing after the terminal event
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn failures_still_count_toward_completion() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir, 5);
        let (tx, rx) = unbounded();

        let mut registry = BackendRegistry::new();
        registry.register("deaf", || Box::new(FakeBackend::new(false)));

        BulkLoader::new(Arc::new(registry), 3).load(paths, tx);
        let events = drain_batch(&rx);

        let failed = events
            .iter()
            .filter(|e| matches!(e, LoaderEvent::SongFailed { .. }))
            .count();
        assert_eq!(failed, 5);

        match events.last() {
            Some(LoaderEvent::AllSongsLoaded { loaded, total }) => {
                assert_eq!(*loaded, 0);
                assert_eq!(*total, 5);
            }
            _ => panic!("expected AllSongsLoaded last"),
        }
    }

    #[test]
    fn sequential_variant_preserves_order() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir, 6);
        let (tx, rx) = unbounded();

        BulkLoader::sequential(registry_accepting_all()).load(paths.clone(), tx);
        let events = drain_batch(&rx);

        let resolved: Vec<PathBuf> = events
            .iter()
            .filter_map(|e| match e {
                LoaderEvent::SongInfoRetrieved(song) => Some(song.path.clone()),
                _ => None,
            })
            .collect();

        assert_eq!(resolved, paths);
    }

    #[test]
    fn empty_batch_completes_immediately() {
        let (tx, rx) = unbounded();
        BulkLoader::new(registry_accepting_all(), 2).load(Vec::new(), tx);

        match rx.recv_timeout(Duration::from_secs(1)).unwrap() {
            LoaderEvent::AllSongsLoaded { loaded, total } => {
                assert_eq!(loaded, 0);
                assert_eq!(total, 0);
            }
            _ => panic!("expected AllSongsLoaded"),
        }
    }
}
