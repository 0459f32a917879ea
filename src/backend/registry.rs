use super::{DecoderBackend, StreamBackend};
use indexmap::IndexMap;

type BackendFactory = Box<dyn Fn() -> Box<dyn DecoderBackend> + Send + Sync>;

/// Ordered name → factory table for decoder backends.
///
/// Insertion order is the probe order during resolution, so callers decide
/// the fallback chain by the order of their `register` calls. Nothing is
/// discovered implicitly.
#[derive(Default)]
pub struct BackendRegistry {
    backends: IndexMap<String, BackendFactory>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in stream-format backend pre-registered.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(StreamBackend::NAME, || Box::new(StreamBackend::new()));
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn DecoderBackend> + Send + Sync + 'static,
    {
        self.backends.insert(name.into(), Box::new(factory));
    }

    /// Fresh instance of a named backend.
    pub fn create(&self, name: &str) -> Option<Box<dyn DecoderBackend>> {
        self.backends.get(name).map(|factory| factory())
    }

    /// Instances in registration order, constructed lazily so a probe chain
    /// that matches early never builds the backends behind it.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Box<dyn DecoderBackend>)> + '_ {
        self.backends
            .iter()
            .map(|(name, factory)| (name.as_str(), factory()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.backends.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FrameBuffer;
    use crate::domain::Song;
    use anyhow::Result;
    use std::path::Path;

    struct Inert;

    impl DecoderBackend for Inert {
        fn probe(&mut self, _path: &Path) -> bool {
            false
        }
        fn extract_metadata(&mut self, _song: &mut Song) -> Result<()> {
            Ok(())
        }
        fn read_frames(&mut self, _sample_rate: u32, _frames: usize) -> Result<FrameBuffer> {
            Ok(Vec::new())
        }
        fn position_seconds(&self) -> f64 {
            0.0
        }
        fn duration_seconds(&self) -> f64 {
            0.0
        }
        fn seek(&mut self, _seconds: f64) {}
        fn free(&mut self) {}
    }

    #[test]
    fn iteration_preserves_registration_order() {
        let mut registry = BackendRegistry::new();
        registry.register("openmpt", || Box::new(Inert));
        registry.register("xmp", || Box::new(Inert));
        registry.register("hively", || Box::new(Inert));

        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["openmpt", "xmp", "hively"]);
    }

    #[test]
    fn create_unknown_backend_is_none() {
        let registry = BackendRegistry::new();
        assert!(registry.create("nope").is_none());
    }
}
