mod registry;
mod stream_backend;

pub use registry::BackendRegistry;
pub use stream_backend::StreamBackend;

use crate::domain::Song;
use anyhow::Result;
use std::path::Path;

/// Interleaved stereo samples. An empty buffer is the end-of-stream signal.
pub type FrameBuffer = Vec<f32>;

/// One decoder implementation able to play some set of module formats.
///
/// Instances are cheap to construct and single-use: `probe` may load the
/// file, `read_frames` streams it, `free` releases it. `free` is idempotent
/// and must be safe to call whether or not the module ever played.
pub trait DecoderBackend: Send {
    /// Cheap feasibility check. A backend that returns true here commits to
    /// `extract_metadata` and `read_frames` working on the same file.
    fn probe(&mut self, path: &Path) -> bool;

    /// Fill every metadata field the format carries.
    fn extract_metadata(&mut self, song: &mut Song) -> Result<()>;

    /// Produce up to `frames` interleaved stereo frames at `sample_rate`.
    /// Zero frames means the module has played out.
    fn read_frames(&mut self, sample_rate: u32, frames: usize) -> Result<FrameBuffer>;

    fn position_seconds(&self) -> f64;

    fn duration_seconds(&self) -> f64;

    /// Best-effort; backends without native seeking may ignore this.
    fn seek(&mut self, seconds: f64);

    fn free(&mut self);

    /// Current module title, if the format can change it mid-play.
    fn title(&self) -> Option<String> {
        None
    }

    /// (current, total). (0, 0) for formats without subsongs.
    fn subsong(&self) -> (u32, u32) {
        (0, 0)
    }
}

impl std::fmt::Debug for dyn DecoderBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn DecoderBackend")
    }
}
