#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub enum PlayMode {
    #[default]
    Linear,
    Random,
}

#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub enum PlaySource {
    #[default]
    Local,
    RemoteArchive,
}

#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub enum ArchiveSource {
    #[default]
    All,
    Favorites,
    Artist,
}

#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub enum LocalSource {
    #[default]
    Playlist,
    Folder,
}

/// Where the next track comes from and in what order.
///
/// Changing any field invalidates the pending queue; the controller clears
/// and repopulates it on every effective edit.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayingConfiguration {
    pub mode: PlayMode,
    pub source: PlaySource,
    pub archive_source: ArchiveSource,
    pub local_source: LocalSource,

    pub favorite_member_id: u64,
    pub artist_filter: Option<String>,
}
