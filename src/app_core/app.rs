use crate::{
    backend::BackendRegistry,
    controller::{Notification, OfflineProvider, PlaybackController},
    get_readable_duration,
    player::RodioSinkFactory,
    settings::PlayerSettings,
    DurationStyle,
};
use anyhow::{bail, Result};
use crossbeam_channel::Receiver;
use std::{
    io::Write,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

const REFRESH_RATE: Duration = Duration::from_millis(33);

/// Minimal console front: resolve everything on the command line, then play
/// it through in order. Exists so the core is usable without a GUI.
pub struct ModPlay {
    controller: PlaybackController,
    notifications: Receiver<Notification>,
    loading: bool,
    done: bool,
}

impl ModPlay {
    pub fn new() -> Self {
        let registry = Arc::new(BackendRegistry::with_builtin());
        let controller = PlaybackController::new(
            registry,
            Arc::new(OfflineProvider),
            Arc::new(RodioSinkFactory),
            PlayerSettings::load(),
        );
        let notifications = controller.notifications();

        ModPlay {
            controller,
            notifications,
            loading: false,
            done: false,
        }
    }

    pub fn run(&mut self, paths: Vec<PathBuf>) -> Result<()> {
        if paths.is_empty() {
            bail!("nothing to play: pass module files or folders");
        }

        let mut files = Vec::new();
        for path in paths {
            let path = crate::expand_tilde(&path)?;
            match path.is_dir() {
                true => files.extend(crate::controller::collect_module_files(&path)),
                false => files.push(path),
            }
        }

        self.controller.load_paths_sequential(files);
        self.loading = true;

        while !self.done {
            self.controller.process_events();
            self.drain_notifications()?;
            std::thread::sleep(REFRESH_RATE);
        }

        Ok(())
    }

    fn drain_notifications(&mut self) -> Result<()> {
        while let Ok(note) = self.notifications.try_recv() {
            match note {
                Notification::SongLoaded(_) => {}
                Notification::SongInfoRetrieved(song) => {
                    println!(
                        "loaded   {} [{}]",
                        song.display_title(),
                        get_readable_duration(song.duration, DurationStyle::Compact)
                    );
                }
                Notification::AllSongsLoaded { loaded, total } => {
                    println!("{loaded}/{total} files ready");
                    self.loading = false;
                    self.controller.play_next()?;
                }
                Notification::PositionChanged { position, duration } => {
                    print!(
                        "\r  {} / {} ",
                        get_readable_duration(
                            Duration::from_secs_f64(position.max(0.0)),
                            DurationStyle::Compact
                        ),
                        get_readable_duration(
                            Duration::from_secs_f64(duration.max(0.0)),
                            DurationStyle::Compact
                        ),
                    );
                    let _ = std::io::stdout().flush();
                }
                Notification::TitleChanged(title) => println!("\ntitle    {title}"),
                Notification::SubsongChanged { current, total } => {
                    println!("\nsubsong  {current}/{total}");
                }
                Notification::SongFinished(song) => {
                    println!("\nfinished {}", song.display_title());
                }
                Notification::PlaybackError(message) => eprintln!("\nplayback error: {message}"),
                Notification::NothingToPlay => {
                    if !self.loading {
                        self.done = true;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for ModPlay {
    fn default() -> Self {
        Self::new()
    }
}
