mod fetch;
mod provider;

pub use provider::{ModuleSourceProvider, OfflineProvider};

use fetch::{spawn_fetch, FetchOutcome, FetchRequest};

use crate::{
    backend::BackendRegistry,
    domain::{ArchiveSource, LocalSource, PlayMode, PlaySource, PlayingConfiguration, Song},
    player::{AudioSinkFactory, PlaybackHandle, PlaybackState, PlayerEvent},
    queue::PlayQueue,
    resolver::{BulkLoader, LoaderEvent, Resolver},
    settings::PlayerSettings,
};
use anyhow::{anyhow, Result};
use crossbeam_channel::{tick, unbounded, Receiver, Sender};
use rand::Rng;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, LazyLock, Mutex,
    },
    thread,
    time::Instant,
};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

static LEGAL_EXTENSION: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        // tracker formats
        "mod", "xm", "s3m", "it", "mptm", "med", "okt", "ahx", "hvl", "mtm", "669", "stm", "ult",
        "dbm", "mo3",
        // plain streams the builtin backend covers
        "mp3", "ogg", "flac", "wav", "m4a",
    ])
});

/// What the embedding front (GUI or CLI) hears from the player core.
#[derive(Debug, Clone)]
pub enum Notification {
    SongLoaded(Song),
    SongInfoRetrieved(Song),
    AllSongsLoaded { loaded: usize, total: usize },
    SongFinished(Song),
    PositionChanged { position: f64, duration: f64 },
    SubsongChanged { current: u32, total: u32 },
    TitleChanged(String),
    PlaybackError(String),
    NothingToPlay,
}

/// Top-level orchestration: owns the queue, the loader, the active engine
/// and the playing configuration, and decides what plays next.
///
/// The controller itself is single-threaded; workers talk back exclusively
/// through channels drained by `process_events`, never by reaching into
/// controller state.
pub struct PlaybackController {
    settings: PlayerSettings,
    config: PlayingConfiguration,
    registry: Arc<BackendRegistry>,
    provider: Arc<dyn ModuleSourceProvider>,
    sink_factory: Arc<dyn AudioSinkFactory>,

    queue: Arc<Mutex<PlayQueue>>,
    playlist: Vec<Song>,
    playlist_pos: usize,

    active: Option<PlaybackHandle>,
    current: Option<Song>,
    /// A song asked to play before its resolution finished.
    waiting: Option<Song>,

    fetch_generation: Arc<AtomicU64>,
    fetch_in_flight: bool,

    player_tx: Sender<PlayerEvent>,
    player_rx: Receiver<PlayerEvent>,
    loader_tx: Sender<LoaderEvent>,
    loader_rx: Receiver<LoaderEvent>,
    fetch_tx: Sender<FetchOutcome>,
    fetch_rx: Receiver<FetchOutcome>,
    prefetch_tx: Sender<Song>,
    prefetch_rx: Receiver<Song>,
    ticker: Receiver<Instant>,

    notify_tx: Sender<Notification>,
    notify_rx: Receiver<Notification>,
}

impl PlaybackController {
    pub fn new(
        registry: Arc<BackendRegistry>,
        provider: Arc<dyn ModuleSourceProvider>,
        sink_factory: Arc<dyn AudioSinkFactory>,
        settings: PlayerSettings,
    ) -> Self {
        let (player_tx, player_rx) = unbounded();
        let (loader_tx, loader_rx) = unbounded();
        let (fetch_tx, fetch_rx) = unbounded();
        let (prefetch_tx, prefetch_rx) = unbounded();
        let (notify_tx, notify_rx) = unbounded();
        let ticker = tick(settings.health_check_interval());

        PlaybackController {
            settings,
            config: PlayingConfiguration::default(),
            registry,
            provider,
            sink_factory,

            queue: Arc::new(Mutex::new(PlayQueue::new())),
            playlist: Vec::new(),
            playlist_pos: 0,

            active: None,
            current: None,
            waiting: None,

            fetch_generation: Arc::new(AtomicU64::new(0)),
            fetch_in_flight: false,

            player_tx,
            player_rx,
            loader_tx,
            loader_rx,
            fetch_tx,
            fetch_rx,
            prefetch_tx,
            prefetch_rx,
            ticker,

            notify_tx,
            notify_rx,
        }
    }

    /// Channel the embedding front listens on.
    pub fn notifications(&self) -> Receiver<Notification> {
        self.notify_rx.clone()
    }

    pub fn queue(&self) -> Arc<Mutex<PlayQueue>> {
        Arc::clone(&self.queue)
    }

    pub fn config(&self) -> &PlayingConfiguration {
        &self.config
    }

    pub fn now_playing(&self) -> Option<&Song> {
        self.current.as_ref()
    }

    pub fn playback_state(&self) -> PlaybackState {
        match &self.active {
            Some(handle) => handle.state(),
            None => PlaybackState::Idle,
        }
    }

    pub fn playlist(&self) -> &[Song] {
        &self.playlist
    }

    // ==================
    //   EVENT DRAINING
    // ==================

    /// Drain every worker channel. Call this from the front's own loop;
    /// it never blocks.
    pub fn process_events(&mut self) {
        while self.ticker.try_recv().is_ok() {
            self.on_health_tick();
        }
        while let Ok(event) = self.loader_rx.try_recv() {
            self.on_loader_event(event);
        }
        while let Ok(outcome) = self.fetch_rx.try_recv() {
            self.on_fetch_outcome(outcome);
        }
        while let Ok(song) = self.prefetch_rx.try_recv() {
            self.on_prefetch_done(song);
        }
        while let Ok(event) = self.player_rx.try_recv() {
            self.on_player_event(event);
        }
    }

    fn on_health_tick(&mut self) {
        if self.config.mode != PlayMode::Random {
            return;
        }
        let empty = self.queue.lock().unwrap().is_empty();
        if empty && !self.fetch_in_flight {
            debug!("queue ran dry, repopulating");
            self.populate_queue();
        }
    }

    fn on_loader_event(&mut self, event: LoaderEvent) {
        match event {
            LoaderEvent::SongLoaded(song) => {
                self.notify(Notification::SongLoaded(song));
            }
            LoaderEvent::SongInfoRetrieved(song) => {
                if self
                    .waiting
                    .as_ref()
                    .is_some_and(|waiting| waiting.id == song.id)
                {
                    self.waiting = None;
                    self.notify(Notification::SongInfoRetrieved(song.clone()));
                    if let Err(e) = self.play(song) {
                        self.notify(Notification::PlaybackError(e.to_string()));
                    }
                    return;
                }

                self.playlist.push(song.clone());
                self.notify(Notification::SongInfoRetrieved(song));
            }
            LoaderEvent::SongFailed { path, error } => {
                warn!(path = %path.display(), "song dropped from batch: {error}");
            }
            LoaderEvent::AllSongsLoaded { loaded, total } => {
                info!(loaded, total, "bulk load finished");
                self.notify(Notification::AllSongsLoaded { loaded, total });
            }
        }
    }

    fn on_fetch_outcome(&mut self, outcome: FetchOutcome) {
        if outcome.generation != self.fetch_generation.load(Ordering::SeqCst) {
            debug!("dropping fetch result from a cancelled configuration");
            return;
        }

        self.fetch_in_flight = false;

        match outcome.result {
            Ok(song) => {
                self.notify(Notification::SongLoaded(song.clone()));
                self.notify(Notification::SongInfoRetrieved(song.clone()));
                self.queue.lock().unwrap().add_song(song);

                if self.active.is_none() && self.waiting.is_none() {
                    if let Err(e) = self.play_next() {
                        self.notify(Notification::PlaybackError(e.to_string()));
                    }
                }
            }
            Err(e) => {
                // The periodic health check retries; no tight loop here.
                warn!("remote fetch failed: {e}");
            }
        }
    }

    fn on_prefetch_done(&mut self, song: Song) {
        self.queue.lock().unwrap().replace_song(song);
    }

    fn on_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::PositionChanged { position, duration } => {
                self.notify(Notification::PositionChanged { position, duration });
            }
            PlayerEvent::SubsongChanged { current, total } => {
                if let Some(song) = &mut self.current {
                    song.current_subsong = current;
                    song.subsong_count = total;
                }
                self.notify(Notification::SubsongChanged { current, total });
            }
            PlayerEvent::TitleChanged(title) => {
                if let Some(song) = &mut self.current {
                    song.title = title.clone();
                }
                self.notify(Notification::TitleChanged(title));
            }
            PlayerEvent::Finished => {
                self.active = None;
                if let Some(song) = self.current.take() {
                    self.notify(Notification::SongFinished(song));
                }
                if let Err(e) = self.play_next() {
                    self.notify(Notification::PlaybackError(e.to_string()));
                }
            }
            PlayerEvent::Error(message) => {
                self.active = None;
                self.current = None;
                self.notify(Notification::PlaybackError(message));
            }
        }
    }

    // ============
    //   PLAYBACK
    // ============

    pub fn play(&mut self, song: Song) -> Result<()> {
        if !song.is_ready {
            debug!(title = %song.display_title(), "deferring playback until resolution finishes");
            self.waiting = Some(song);
            return Ok(());
        }

        self.stop();

        let backend = self
            .registry
            .create(&song.backend_name)
            .ok_or_else(|| anyhow!("no backend registered under {:?}", song.backend_name))?;

        let handle = PlaybackHandle::start(
            song.clone(),
            backend,
            Arc::clone(&self.sink_factory),
            self.player_tx.clone(),
            self.settings.engine_config(),
            self.settings.stop_grace(),
        );

        info!(title = %song.display_title(), backend = %song.backend_name, "playing");
        self.current = Some(song);
        self.active = Some(handle);

        self.prefetch_next();
        Ok(())
    }

    pub fn play_pause(&mut self) -> Result<()> {
        if let Some(handle) = &self.active {
            if handle.metrics().is_active() {
                return handle.toggle_playback();
            }
        }
        self.play_next()
    }

    pub fn stop(&mut self) {
        if let Some(mut handle) = self.active.take() {
            handle.stop();
        }
        self.current = None;
    }

    pub fn seek(&self, seconds: f64) -> Result<()> {
        match &self.active {
            Some(handle) => handle.seek(seconds),
            None => Ok(()),
        }
    }

    pub fn play_next(&mut self) -> Result<()> {
        let song = match self.take_next_song() {
            Some(song) => Some(song),
            None => {
                // One repopulation attempt, then give up until something
                // lands in the queue on its own.
                self.populate_queue();
                self.take_next_song()
            }
        };

        match song {
            Some(song) => self.play(song),
            None => {
                if !self.fetch_in_flight {
                    self.notify(Notification::NothingToPlay);
                }
                Ok(())
            }
        }
    }

    pub fn play_previous(&mut self) -> Result<()> {
        match self.config.mode {
            PlayMode::Random => {
                // The song being played is already in history; step over it
                // to reach the one before.
                let undos = if self.current.is_some() { 2 } else { 1 };
                let mut queue = self.queue.lock().unwrap();
                for _ in 0..undos {
                    if !queue.undo_last() {
                        break;
                    }
                }
            }
            PlayMode::Linear => {
                self.playlist_pos = self.playlist_pos.saturating_sub(2);
                self.requeue_playlist();
            }
        }

        self.play_next()
    }

    fn take_next_song(&mut self) -> Option<Song> {
        let song = self.queue.lock().unwrap().pop_next_song()?;

        if let Some(pos) = self.playlist.iter().position(|s| s.id == song.id) {
            self.playlist_pos = pos + 1;
        }

        Some(song)
    }

    /// Replace the queue with the playlist tail from the current position.
    fn requeue_playlist(&mut self) {
        let tail: Vec<Song> = self.playlist[self.playlist_pos.min(self.playlist.len())..].to_vec();
        self.queue.lock().unwrap().set_queue(tail);
    }

    fn prefetch_next(&mut self) {
        let next = {
            let queue = self.queue.lock().unwrap();
            queue
                .peek_next_song()
                .filter(|song| !song.is_ready)
                .cloned()
        };

        let Some(mut song) = next else { return };

        let registry = Arc::clone(&self.registry);
        let tx = self.prefetch_tx.clone();
        thread::spawn(move || match Resolver::resolve(&mut song, &registry) {
            Ok(mut backend) => {
                backend.free();
                let _ = tx.send(song);
            }
            Err(e) => warn!(path = %song.path.display(), "prefetch resolution failed: {e}"),
        });
    }

    // ====================
    //   QUEUE POPULATION
    // ====================

    pub fn populate_queue(&mut self) {
        match self.config.source {
            PlaySource::Local => match self.config.mode {
                PlayMode::Linear => self.requeue_playlist(),
                PlayMode::Random => self.queue_random_local_song(),
            },
            PlaySource::RemoteArchive => self.request_remote_song(),
        }
    }

    fn queue_random_local_song(&mut self) {
        let candidates: Vec<&Song> = self.playlist.iter().filter(|s| s.is_ready).collect();
        if candidates.is_empty() {
            return;
        }

        let pick = rand::rng().random_range(0..candidates.len());
        let song = candidates[pick].clone();
        self.queue.lock().unwrap().add_song(song);
    }

    fn request_remote_song(&mut self) {
        if self.fetch_in_flight {
            return;
        }

        let archive_source = match self.config.archive_source {
            ArchiveSource::Artist if self.config.artist_filter.is_none() => {
                warn!("artist source without an artist filter, using the whole archive");
                ArchiveSource::All
            }
            source => source,
        };

        let request = FetchRequest {
            generation: self.fetch_generation.load(Ordering::SeqCst),
            archive_source,
            member_id: self.config.favorite_member_id,
            artist: self.config.artist_filter.clone(),
            dest_dir: self.settings.download_dir(),
        };

        self.fetch_in_flight = true;
        spawn_fetch(
            request,
            Arc::clone(&self.provider),
            Arc::clone(&self.registry),
            self.fetch_tx.clone(),
        );
    }

    // =============
    //   LOADING
    // =============

    /// Resolve many files on the bulk pool; results land in the playlist.
    pub fn load_paths(&self, paths: Vec<PathBuf>) {
        BulkLoader::new(Arc::clone(&self.registry), self.settings.bulk_concurrency)
            .load(paths, self.loader_tx.clone());
    }

    /// Order-preserving variant for playlist construction.
    pub fn load_paths_sequential(&self, paths: Vec<PathBuf>) {
        BulkLoader::sequential(Arc::clone(&self.registry)).load(paths, self.loader_tx.clone());
    }

    /// Walk a folder for playable files and load them in list order.
    pub fn scan_folder(&self, dir: &Path) -> usize {
        let files = collect_module_files(dir);
        let count = files.len();
        info!(dir = %dir.display(), count, "folder scan complete");
        self.load_paths_sequential(files);
        count
    }

    pub fn set_playlist(&mut self, songs: Vec<Song>) {
        self.playlist = songs;
        self.playlist_pos = 0;
    }

    // ==========================
    //   CONFIGURATION MUTATION
    // ==========================

    pub fn set_playing_mode(&mut self, mode: PlayMode) {
        if self.config.mode == mode {
            return;
        }
        self.config.mode = mode;
        self.invalidate_queue();
    }

    pub fn set_playing_source(&mut self, source: PlaySource) {
        if self.config.source == source {
            return;
        }
        self.config.source = source;
        self.invalidate_queue();
    }

    pub fn set_archive_source(&mut self, source: ArchiveSource) {
        let source = match source {
            ArchiveSource::Artist if self.config.artist_filter.is_none() => {
                warn!("artist source selected without an artist filter, falling back to all");
                ArchiveSource::All
            }
            source => source,
        };

        if self.config.archive_source == source {
            return;
        }
        self.config.archive_source = source;
        self.invalidate_queue();
    }

    pub fn set_local_source(&mut self, source: LocalSource) {
        if self.config.local_source == source {
            return;
        }
        self.config.local_source = source;
        self.invalidate_queue();
    }

    pub fn set_artist_filter(&mut self, artist: Option<String>) {
        self.config.artist_filter = artist;
    }

    pub fn set_favorite_member(&mut self, member_id: u64) {
        self.config.favorite_member_id = member_id;
    }

    /// Every effective configuration edit lands here: the pending queue is
    /// stale, in-flight fetches belong to the old world, and random mode
    /// wants the queue primed again.
    fn invalidate_queue(&mut self) {
        self.cancel_fetches();
        self.queue.lock().unwrap().clear();

        if self.config.mode == PlayMode::Random {
            self.populate_queue();
        }
    }

    fn cancel_fetches(&mut self) {
        self.fetch_generation.fetch_add(1, Ordering::SeqCst);
        self.fetch_in_flight = false;
    }

    fn notify(&self, notification: Notification) {
        let _ = self.notify_tx.send(notification);
    }
}

pub(crate) fn collect_module_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| LEGAL_EXTENSION.contains(ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::AudioSink;
    use crate::resolver::test_support::FakeBackend;
    use std::time::Duration;
    use tempfile::TempDir;

    struct NullSink;

    impl AudioSink for NullSink {
        fn write(&mut self, _samples: &[f32], _sample_rate: u32) -> Result<()> {
            Ok(())
        }
        fn stop(&mut self) {}
    }

    struct NullSinkFactory;

    impl AudioSinkFactory for NullSinkFactory {
        fn create(&self) -> Result<Box<dyn AudioSink>> {
            Ok(Box::new(NullSink))
        }
    }

    struct ScriptedProvider {
        delay: Duration,
        id: u64,
    }

    impl ModuleSourceProvider for ScriptedProvider {
        fn fetch_random_id(&self) -> Result<Option<u64>> {
            thread::sleep(self.delay);
            Ok(Some(self.id))
        }

        fn fetch_random_favorite_id(&self, _member_id: u64) -> Result<Option<u64>> {
            self.fetch_random_id()
        }

        fn fetch_random_artist_id(&self, _artist: &str) -> Result<Option<u64>> {
            self.fetch_random_id()
        }

        fn materialize(&self, id: u64, dest_dir: &Path) -> Result<Option<PathBuf>> {
            let path = dest_dir.join(format!("{id}.mod"));
            std::fs::write(&path, b"remote module data")?;
            Ok(Some(path))
        }
    }

    fn fake_registry() -> Arc<BackendRegistry> {
        let mut registry = BackendRegistry::new();
        // Slow the scripted decoder down enough that tracks do not finish
        // between two controller polls
        registry.register("fake", || {
            let mut backend = FakeBackend::new(true);
            backend.reads_left = 5;
            backend.read_delay = Duration::from_millis(20);
            Box::new(backend)
        });
        Arc::new(registry)
    }

    fn test_settings(dir: &TempDir) -> PlayerSettings {
        PlayerSettings {
            download_dir: Some(dir.path().to_path_buf()),
            health_check_secs: 1,
            ..Default::default()
        }
    }

    fn controller_with(provider: Arc<dyn ModuleSourceProvider>, dir: &TempDir) -> PlaybackController {
        PlaybackController::new(
            fake_registry(),
            provider,
            Arc::new(NullSinkFactory),
            test_settings(dir),
        )
    }

    fn ready_song(id: u64, title: &str) -> Song {
        Song {
            id,
            title: title.to_string(),
            backend_name: "fake".to_string(),
            is_ready: true,
            ..Default::default()
        }
    }

    fn drain(rx: &Receiver<Notification>) -> Vec<Notification> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn artist_source_without_filter_falls_back_to_all() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller_with(Arc::new(OfflineProvider), &dir);

        controller.set_archive_source(ArchiveSource::Artist);
        assert_eq!(controller.config().archive_source, ArchiveSource::All);

        controller.set_artist_filter(Some("purple motion".to_string()));
        controller.set_archive_source(ArchiveSource::Artist);
        assert_eq!(controller.config().archive_source, ArchiveSource::Artist);
    }

    #[test]
    fn stale_fetch_results_never_surface() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(ScriptedProvider {
            delay: Duration::from_millis(100),
            id: 777,
        });
        let mut controller = controller_with(provider, &dir);
        let notifications = controller.notifications();

        controller.set_playing_mode(PlayMode::Random);
        controller.set_playing_source(PlaySource::RemoteArchive);

        // The fetch is now in flight; switching back to local cancels it
        controller.set_playing_source(PlaySource::Local);

        thread::sleep(Duration::from_millis(300));
        controller.process_events();

        let events = drain(&notifications);
        assert!(
            !events
                .iter()
                .any(|n| matches!(n, Notification::SongLoaded(_))),
            "cancelled fetch must not deliver a song"
        );
        assert!(controller.queue().lock().unwrap().is_empty());
    }

    #[test]
    fn remote_fetch_appends_and_plays() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(ScriptedProvider {
            delay: Duration::from_millis(10),
            id: 4242,
        });
        let mut controller = controller_with(provider, &dir);
        let notifications = controller.notifications();

        controller.set_playing_mode(PlayMode::Random);
        controller.set_playing_source(PlaySource::RemoteArchive);

        let deadline = Instant::now() + Duration::from_secs(3);
        while controller.now_playing().is_none() && Instant::now() < deadline {
            controller.process_events();
            thread::sleep(Duration::from_millis(10));
        }

        let playing = controller.now_playing().expect("fetched song should play");
        assert_eq!(playing.archive_id, 4242);
        assert!(playing.is_ready);

        let events = drain(&notifications);
        assert!(events
            .iter()
            .any(|n| matches!(n, Notification::SongInfoRetrieved(_))));
    }

    #[test]
    fn empty_queue_play_next_repopulates_once() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller_with(Arc::new(OfflineProvider), &dir);

        controller.set_playlist(vec![
            ready_song(1, "first"),
            ready_song(2, "second"),
            ready_song(3, "third"),
        ]);

        assert!(controller.queue().lock().unwrap().is_empty());
        controller.play_next().unwrap();

        assert_eq!(controller.now_playing().unwrap().id, 1);
        assert_eq!(controller.queue().lock().unwrap().len(), 2);
    }

    #[test]
    fn finished_track_advances_to_the_next() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller_with(Arc::new(OfflineProvider), &dir);
        let notifications = controller.notifications();

        controller.set_playlist(vec![ready_song(1, "first"), ready_song(2, "second")]);
        controller.play_next().unwrap();

        let deadline = Instant::now() + Duration::from_secs(3);
        let mut finished = 0;
        while finished == 0 && Instant::now() < deadline {
            controller.process_events();
            finished += drain(&notifications)
                .iter()
                .filter(|n| matches!(n, Notification::SongFinished(_)))
                .count();
            thread::sleep(Duration::from_millis(10));
        }

        assert!(finished > 0, "first song never finished");
        assert_eq!(controller.now_playing().unwrap().id, 2);
    }

    #[test]
    fn deferred_song_starts_once_resolved() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller_with(Arc::new(OfflineProvider), &dir);

        let mut shell = ready_song(9, "late bloomer");
        shell.is_ready = false;
        shell.backend_name.clear();

        controller.play(shell.clone()).unwrap();
        assert!(controller.now_playing().is_none());

        let resolved = ready_song(9, "late bloomer");
        controller.loader_tx.send(LoaderEvent::SongInfoRetrieved(resolved)).unwrap();
        controller.process_events();

        assert_eq!(controller.now_playing().unwrap().id, 9);
    }

    #[test]
    fn mode_switch_invalidates_queue() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller_with(Arc::new(OfflineProvider), &dir);

        controller
            .queue()
            .lock()
            .unwrap()
            .add_songs([ready_song(1, "a"), ready_song(2, "b")]);

        controller.set_playing_mode(PlayMode::Random);
        assert!(controller.queue().lock().unwrap().is_empty());
    }

    #[test]
    fn folder_scan_only_picks_playable_extensions() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("one.mod"), b"m").unwrap();
        std::fs::write(dir.path().join("two.xm"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"t").unwrap();

        let files = collect_module_files(dir.path());
        assert_eq!(files.len(), 2);
    }
}
