use super::{
    AudioSink, AudioSinkFactory, EngineConfig, PlaybackMetrics, PlaybackState, PlayerCommand,
    PlayerEvent,
};
use crate::{backend::DecoderBackend, domain::Song};
use crossbeam_channel::{Receiver, Sender};
use std::{
    ops::ControlFlow,
    sync::Arc,
    thread::{self, JoinHandle},
};
use tracing::{debug, warn};

/// The streaming loop. One engine per track: it owns the live backend and
/// the audio sink for the track's whole lifetime and is the only thing that
/// touches either.
pub struct PlaybackEngine {
    song: Song,
    backend: Box<dyn DecoderBackend>,
    sink: Box<dyn AudioSink>,
    commands: Receiver<PlayerCommand>,
    events: Sender<PlayerEvent>,
    metrics: Arc<PlaybackMetrics>,
    config: EngineConfig,

    last_title: String,
    last_subsong: (u32, u32),
}

impl PlaybackEngine {
    pub fn spawn(
        song: Song,
        backend: Box<dyn DecoderBackend>,
        sink_factory: Arc<dyn AudioSinkFactory>,
        commands: Receiver<PlayerCommand>,
        events: Sender<PlayerEvent>,
        metrics: Arc<PlaybackMetrics>,
        config: EngineConfig,
    ) -> JoinHandle<()> {
        thread::spawn(move || {
            // The sink has to be built on this side of the spawn; audio
            // device handles are not Send.
            let sink = match sink_factory.create() {
                Ok(sink) => sink,
                Err(e) => {
                    let mut backend = backend;
                    backend.free();
                    metrics.set_state(PlaybackState::Stopped);
                    let _ = events.send(PlayerEvent::Error(format!("no audio sink: {e}")));
                    return;
                }
            };

            let last_title = song.title.clone();
            let last_subsong = (song.current_subsong, song.subsong_count);

            let mut engine = PlaybackEngine {
                song,
                backend,
                sink,
                commands,
                events,
                metrics,
                config,
                last_title,
                last_subsong,
            };

            engine.metrics.set_state(PlaybackState::Playing);
            engine.run();
        })
    }

    fn run(&mut self) {
        debug!(title = %self.song.display_title(), "streaming started");

        loop {
            if self.process_commands().is_break() {
                break;
            }

            if self.metrics.get_state() == PlaybackState::Paused {
                thread::sleep(self.config.pause_poll);
                continue;
            }

            let buf = match self
                .backend
                .read_frames(self.config.sample_rate, self.config.frames_per_read)
            {
                Ok(buf) => buf,
                Err(e) => {
                    // Decoder hiccups are not fatal; only a zero-frame read
                    // ends the track.
                    warn!("decoder error mid-stream: {e}");
                    continue;
                }
            };

            if buf.is_empty() {
                self.metrics.set_state(PlaybackState::Finished);
                self.emit(PlayerEvent::Finished);
                break;
            }

            if let Err(e) = self.sink.write(&buf, self.config.sample_rate) {
                self.emit(PlayerEvent::Error(format!("audio sink failed: {e}")));
                break;
            }

            let position = self.backend.position_seconds();
            let duration = self.backend.duration_seconds();
            self.metrics.set_position(position, duration);
            self.emit(PlayerEvent::PositionChanged { position, duration });

            self.poll_module_state();
        }

        self.backend.free();
        self.sink.stop();

        if self.metrics.get_state() != PlaybackState::Finished {
            self.metrics.set_state(PlaybackState::Stopped);
        }

        debug!(title = %self.song.display_title(), "streaming ended");
    }

    fn process_commands(&mut self) -> ControlFlow<()> {
        while let Ok(cmd) = self.commands.try_recv() {
            match cmd {
                PlayerCommand::TogglePlayback => self.toggle_playback(),
                PlayerCommand::Seek(seconds) => self.backend.seek(seconds),
                PlayerCommand::Stop => return ControlFlow::Break(()),
            }
        }

        ControlFlow::Continue(())
    }

    fn toggle_playback(&mut self) {
        match self.metrics.get_state() {
            PlaybackState::Playing => self.metrics.set_state(PlaybackState::Paused),
            PlaybackState::Paused => self.metrics.set_state(PlaybackState::Playing),
            _ => {}
        }
    }

    /// Some formats rename the track or hop subsongs mid-play; surface both
    /// as change events without spamming every buffer.
    fn poll_module_state(&mut self) {
        if let Some(title) = self.backend.title() {
            if title != self.last_title && !title.is_empty() {
                self.last_title = title.clone();
                self.emit(PlayerEvent::TitleChanged(title));
            }
        }

        let subsong = self.backend.subsong();
        if subsong != self.last_subsong && subsong != (0, 0) {
            self.last_subsong = subsong;
            self.emit(PlayerEvent::SubsongChanged {
                current: subsong.0,
                total: subsong.1,
            });
        }
    }

    fn emit(&self, event: PlayerEvent) {
        let _ = self.events.send(event);
    }
}
