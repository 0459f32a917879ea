use super::{DecoderBackend, FrameBuffer};
use crate::domain::Song;
use anyhow::{anyhow, Context, Result};
use lofty::{
    config::ParseOptions,
    file::{AudioFile, TaggedFileExt},
    probe::Probe,
    tag::{Accessor, ItemKey},
};
use rodio::{source::UniformSourceIterator, Decoder, Source};
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

const STEREO: u16 = 2;

/// Built-in backend for plain streamed formats (mp3, ogg, flac, wav, ...).
///
/// Tracker formats need their own native backends; this one exists so the
/// registry is never empty and mixed local folders still play end to end.
pub struct StreamBackend {
    path: PathBuf,
    decoder: Option<Decoder<BufReader<File>>>,
    source: Option<UniformSourceIterator<Decoder<BufReader<File>>>>,
    duration: f64,
    clock_frames: u64,
    sample_rate: u32,
}

impl StreamBackend {
    pub const NAME: &'static str = "stream";

    pub fn new() -> Self {
        StreamBackend {
            path: PathBuf::new(),
            decoder: None,
            source: None,
            duration: 0.0,
            clock_frames: 0,
            sample_rate: 0,
        }
    }

    fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>> {
        let file = File::open(path)?;

        let mut builder = Decoder::builder()
            .with_data(BufReader::new(file))
            .with_seekable(true);

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            let hint = match ext {
                "adif" | "adts" => "aac",
                "m4a" | "m4b" | "m4r" | "mp4" => "audio/mp4",
                "bit" | "mpga" => "mp3",
                "oga" | "ogx" | "spx" => "audio/ogg",
                "wave" => "wav",
                _ => ext,
            };
            builder = builder.with_hint(hint);
        }

        Ok(builder.build()?)
    }
}

impl Default for StreamBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderBackend for StreamBackend {
    fn probe(&mut self, path: &Path) -> bool {
        match Self::open_decoder(path) {
            Ok(decoder) => {
                self.path = path.to_path_buf();
                self.decoder = Some(decoder);
                true
            }
            Err(e) => {
                debug!(path = %path.display(), "stream decoder rejected file: {e}");
                false
            }
        }
    }

    fn extract_metadata(&mut self, song: &mut Song) -> Result<()> {
        let tagged = Probe::open(&song.path)?
            .options(ParseOptions::new())
            .read()
            .context("could not parse tags")?;

        let properties = tagged.properties();
        song.duration = properties.duration();
        self.duration = properties.duration().as_secs_f64();

        song.format_name = format!("{:?}", tagged.file_type());
        song.module_type = song
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_uppercase)
            .unwrap_or_default();

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            song.title = tag.title().map(|s| s.as_ref().to_string()).unwrap_or_default();
            song.artist = tag.artist().map(|s| s.as_ref().to_string()).unwrap_or_default();
            song.message = tag
                .comment()
                .map(|s| s.as_ref().to_string())
                .unwrap_or_default();
            song.credits.comment = song.message.clone();
            song.credits.composer = tag
                .get_string(&ItemKey::Composer)
                .map(str::to_string)
                .unwrap_or_default();
        }

        if song.title.is_empty() {
            song.title = song
                .path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        song.subsong_count = 1;
        song.current_subsong = 1;

        Ok(())
    }

    fn read_frames(&mut self, sample_rate: u32, frames: usize) -> Result<FrameBuffer> {
        if sample_rate == 0 {
            return Err(anyhow!("sample rate must be non-zero"));
        }

        if self.source.is_none() {
            let decoder = self
                .decoder
                .take()
                .ok_or_else(|| anyhow!("no module loaded"))?;
            self.source = Some(UniformSourceIterator::new(decoder, STEREO, sample_rate));
            self.sample_rate = sample_rate;
        }

        let source = match self.source.as_mut() {
            Some(source) => source,
            None => return Err(anyhow!("no module loaded")),
        };

        let wanted = frames * STEREO as usize;
        let mut buf = Vec::with_capacity(wanted);
        for sample in source.by_ref().take(wanted) {
            buf.push(sample);
        }

        self.clock_frames += (buf.len() / STEREO as usize) as u64;
        Ok(buf)
    }

    fn position_seconds(&self) -> f64 {
        match self.sample_rate {
            0 => 0.0,
            rate => self.clock_frames as f64 / rate as f64,
        }
    }

    fn duration_seconds(&self) -> f64 {
        if self.duration > 0.0 {
            return self.duration;
        }
        self.decoder
            .as_ref()
            .and_then(|d| d.total_duration())
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }

    fn seek(&mut self, seconds: f64) {
        if let Some(source) = self.source.as_mut() {
            match source.try_seek(Duration::from_secs_f64(seconds.max(0.0))) {
                Ok(()) => {
                    self.clock_frames = (seconds.max(0.0) * self.sample_rate as f64) as u64;
                }
                Err(e) => debug!("seek unsupported for this stream: {e}"),
            }
        }
    }

    fn free(&mut self) {
        self.decoder = None;
        self.source = None;
    }
}
