use super::PlaybackState;
use std::sync::{
    atomic::{AtomicU64, AtomicU8, Ordering},
    Arc,
};

/// Lock-free view of the streaming thread, shared with the controller.
pub struct PlaybackMetrics {
    state: AtomicU8,
    position_ms: AtomicU64,
    duration_ms: AtomicU64,
}

impl PlaybackMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(PlaybackMetrics {
            state: AtomicU8::new(PlaybackState::Idle as u8),
            position_ms: AtomicU64::new(0),
            duration_ms: AtomicU64::new(0),
        })
    }

    pub fn get_state(&self) -> PlaybackState {
        self.state
            .load(Ordering::Relaxed)
            .try_into()
            .unwrap_or(PlaybackState::Stopped)
    }

    pub fn set_state(&self, state: PlaybackState) {
        self.state.store(state as u8, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        PlaybackState::Paused == self.get_state()
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.get_state(),
            PlaybackState::Loaded | PlaybackState::Playing | PlaybackState::Paused
        )
    }

    pub fn position_seconds(&self) -> f64 {
        self.position_ms.load(Ordering::Relaxed) as f64 / 1_000.0
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_ms.load(Ordering::Relaxed) as f64 / 1_000.0
    }

    pub fn set_position(&self, position: f64, duration: f64) {
        self.position_ms
            .store((position.max(0.0) * 1_000.0) as u64, Ordering::Relaxed);
        self.duration_ms
            .store((duration.max(0.0) * 1_000.0) as u64, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.set_position(0.0, 0.0);
        self.set_state(PlaybackState::Stopped);
    }
}
