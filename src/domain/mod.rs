mod playing_config;
mod song;

pub use playing_config::{ArchiveSource, LocalSource, PlayMode, PlaySource, PlayingConfiguration};
pub use song::{Fingerprints, Song, SongCredits};
