mod engine;
mod handle;
mod metrics;
mod sink;

pub use engine::PlaybackEngine;
pub use handle::PlaybackHandle;
pub use metrics::PlaybackMetrics;
pub use sink::{AudioSink, AudioSinkFactory, RodioSinkFactory};

use std::time::Duration;

pub enum PlayerCommand {
    TogglePlayback,
    Seek(f64),
    Stop,
}

pub enum PlayerEvent {
    PositionChanged { position: f64, duration: f64 },
    SubsongChanged { current: u32, total: u32 },
    TitleChanged(String),
    Finished,
    Error(String),
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[repr(u8)]
pub enum PlaybackState {
    Idle = 0,
    Loaded = 1,
    Playing = 2,
    Paused = 3,
    Stopped = 4,
    Finished = 5,
}

impl From<PlaybackState> for u8 {
    fn from(state: PlaybackState) -> u8 {
        state as u8
    }
}

impl TryFrom<u8> for PlaybackState {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0 => Ok(PlaybackState::Idle),
            1 => Ok(PlaybackState::Loaded),
            2 => Ok(PlaybackState::Playing),
            3 => Ok(PlaybackState::Paused),
            4 => Ok(PlaybackState::Stopped),
            5 => Ok(PlaybackState::Finished),
            _ => Err(()),
        }
    }
}

/// Streaming knobs handed to the engine thread.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub sample_rate: u32,
    pub frames_per_read: usize,
    pub pause_poll: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            sample_rate: 44_100,
            frames_per_read: 4_096,
            pause_poll: Duration::from_millis(100),
        }
    }
}
