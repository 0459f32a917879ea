use super::{
    AudioSinkFactory, EngineConfig, PlaybackEngine, PlaybackMetrics, PlaybackState, PlayerCommand,
    PlayerEvent,
};
use crate::{backend::DecoderBackend, domain::Song};
use anyhow::Result;
use crossbeam_channel::{unbounded, Sender};
use std::{
    sync::Arc,
    thread::JoinHandle,
    time::{Duration, Instant},
};
use tracing::warn;

const JOIN_POLL: Duration = Duration::from_millis(10);

/// Controller-side grip on one streaming engine.
///
/// Dropping the handle stops playback; `stop` itself is idempotent and safe
/// from any state. A worker that refuses to die within the grace period is
/// abandoned rather than allowed to wedge shutdown — it still frees the
/// backend on its own way out, whenever that happens.
pub struct PlaybackHandle {
    commands: Sender<PlayerCommand>,
    metrics: Arc<PlaybackMetrics>,
    thread: Option<JoinHandle<()>>,
    grace: Duration,
}

impl PlaybackHandle {
    pub fn start(
        song: Song,
        backend: Box<dyn DecoderBackend>,
        sink_factory: Arc<dyn AudioSinkFactory>,
        events: Sender<PlayerEvent>,
        config: EngineConfig,
        grace: Duration,
    ) -> Self {
        let (cmd_tx, cmd_rx) = unbounded();
        let metrics = PlaybackMetrics::new();
        metrics.set_state(PlaybackState::Loaded);

        let thread = PlaybackEngine::spawn(
            song,
            backend,
            sink_factory,
            cmd_rx,
            events,
            Arc::clone(&metrics),
            config,
        );

        PlaybackHandle {
            commands: cmd_tx,
            metrics,
            thread: Some(thread),
            grace,
        }
    }

    pub fn toggle_playback(&self) -> Result<()> {
        self.commands.send(PlayerCommand::TogglePlayback)?;
        Ok(())
    }

    pub fn seek(&self, seconds: f64) -> Result<()> {
        self.commands.send(PlayerCommand::Seek(seconds))?;
        Ok(())
    }

    /// Ask the engine to exit and wait out the grace period. On expiry the
    /// thread is abandoned: a wedged decoder must not block shutdown.
    pub fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };

        let _ = self.commands.send(PlayerCommand::Stop);

        let deadline = Instant::now() + self.grace;
        while !thread.is_finished() && Instant::now() < deadline {
            std::thread::sleep(JOIN_POLL);
        }

        if thread.is_finished() {
            let _ = thread.join();
        } else {
            warn!(grace = ?self.grace, "playback worker ignored stop, abandoning it");
            self.metrics.set_state(PlaybackState::Stopped);
        }
    }

    pub fn metrics(&self) -> Arc<PlaybackMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn state(&self) -> PlaybackState {
        self.metrics.get_state()
    }

    pub fn is_paused(&self) -> bool {
        self.metrics.is_paused()
    }

    pub fn position_seconds(&self) -> f64 {
        self.metrics.position_seconds()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.metrics.duration_seconds()
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
