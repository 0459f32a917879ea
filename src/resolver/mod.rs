mod loader;

pub use loader::{BulkLoader, LoaderEvent};

use crate::{
    backend::{BackendRegistry, DecoderBackend},
    domain::Song,
};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("no backend accepted {0}")]
    Unsupported(PathBuf),

    #[error("metadata extraction failed")]
    MetadataFailed(#[source] anyhow::Error),
}

/// First-match-wins backend selection for a single candidate file.
pub struct Resolver;

impl Resolver {
    /// Probe the registry in order and bind `song` to the first backend that
    /// accepts it, filling metadata and fingerprints along the way.
    ///
    /// The returned backend instance is live (the module is loaded); the
    /// caller owns it and is responsible for `free`. A backend that accepts
    /// the probe but fails metadata extraction is final for this song — no
    /// further backends are tried after a successful probe.
    pub fn resolve(
        song: &mut Song,
        registry: &BackendRegistry,
    ) -> Result<Box<dyn DecoderBackend>, ResolutionError> {
        let (name, mut backend) = Self::assign_backend(song, registry)?;
        Self::extract_info(song, backend.as_mut())?;

        song.backend_name = name;
        song.is_ready = true;
        Ok(backend)
    }

    /// Probe phase only: find the accepting backend without touching the
    /// song. Used by the bulk loader to report acceptance before metadata.
    pub(crate) fn assign_backend(
        song: &Song,
        registry: &BackendRegistry,
    ) -> Result<(String, Box<dyn DecoderBackend>), ResolutionError> {
        for (name, mut backend) in registry.iter() {
            if backend.probe(&song.path) {
                debug!(backend = name, path = %song.path.display(), "probe accepted");
                return Ok((name.to_string(), backend));
            }
        }

        Err(ResolutionError::Unsupported(song.path.clone()))
    }

    /// Metadata phase: backend fills its fields, then the content checksums
    /// are computed if missing.
    pub(crate) fn extract_info(
        song: &mut Song,
        backend: &mut dyn DecoderBackend,
    ) -> Result<(), ResolutionError> {
        backend
            .extract_metadata(song)
            .map_err(ResolutionError::MetadataFailed)?;

        song.ensure_fingerprints()
            .map_err(ResolutionError::MetadataFailed)?;

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::FakeBackend;
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tempfile::NamedTempFile;

    fn song_for(file: &NamedTempFile) -> Song {
        Song::from_path(file.path())
    }

    #[test]
    fn first_accepting_backend_wins() {
        let file = NamedTempFile::new().unwrap();
        let probes_after = Arc::new(AtomicUsize::new(0));
        let probes_after_clone = Arc::clone(&probes_after);

        let mut registry = BackendRegistry::new();
        registry.register("deaf", || Box::new(FakeBackend::new(false)));
        registry.register("keen", || Box::new(FakeBackend::new(true)));
        registry.register("late", move || {
            let mut backend = FakeBackend::new(true);
            backend.probes = Arc::clone(&probes_after_clone);
            Box::new(backend)
        });

        let mut song = song_for(&file);
        let backend = Resolver::resolve(&mut song, &registry).unwrap();

        assert!(song.is_ready);
        assert_eq!(song.backend_name, "keen");
        assert_eq!(song.title, "scripted");
        assert!(song.fingerprints.is_some());
        assert!(backend.duration_seconds() > 0.0);

        // Backends behind the match are never probed
        assert_eq!(probes_after.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn no_accepting_backend_is_unsupported() {
        let file = NamedTempFile::new().unwrap();

        let mut registry = BackendRegistry::new();
        registry.register("deaf", || Box::new(FakeBackend::new(false)));
        registry.register("mute", || Box::new(FakeBackend::new(false)));

        let mut song = song_for(&file);
        let err = Resolver::resolve(&mut song, &registry).unwrap_err();

        assert!(matches!(err, ResolutionError::Unsupported(_)));
        assert!(!song.is_ready);
        assert!(song.backend_name.is_empty());
    }

    #[test]
    fn metadata_failure_does_not_fall_through() {
        let file = NamedTempFile::new().unwrap();

        let mut registry = BackendRegistry::new();
        registry.register("broken", || {
            Box::new(FakeBackend {
                metadata_fails: true,
                ..FakeBackend::new(true)
            })
        });
        // A healthy backend behind the broken one must never be reached
        registry.register("healthy", || Box::new(FakeBackend::new(true)));

        let mut song = song_for(&file);
        let err = Resolver::resolve(&mut song, &registry).unwrap_err();

        assert!(matches!(err, ResolutionError::MetadataFailed(_)));
        assert!(!song.is_ready);
        assert!(song.backend_name.is_empty());
    }
}
