use anyhow::Result;
use rodio::{buffer::SamplesBuffer, OutputStream, OutputStreamBuilder, Sink};
use std::{thread, time::Duration};

/// Where decoded frames go. Implementations are created inside the
/// streaming thread (audio device handles rarely cross threads) and live
/// for exactly one track.
pub trait AudioSink {
    fn write(&mut self, samples: &[f32], sample_rate: u32) -> Result<()>;
    fn stop(&mut self);
}

/// Builds the sink on the streaming thread's side of the spawn.
pub trait AudioSinkFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn AudioSink>>;
}

// How many queued buffers the device sink may hold before writes pace
// themselves. Keeps memory flat without starving the device.
const MAX_QUEUED_BUFFERS: usize = 3;

pub struct RodioSink {
    sink: Sink,
    _stream: OutputStream,
}

impl AudioSink for RodioSink {
    fn write(&mut self, samples: &[f32], sample_rate: u32) -> Result<()> {
        while self.sink.len() > MAX_QUEUED_BUFFERS {
            thread::sleep(Duration::from_millis(5));
        }

        self.sink
            .append(SamplesBuffer::new(2, sample_rate, samples.to_vec()));
        self.sink.play();
        Ok(())
    }

    fn stop(&mut self) {
        self.sink.stop();
    }
}

#[derive(Default)]
pub struct RodioSinkFactory;

impl AudioSinkFactory for RodioSinkFactory {
    fn create(&self) -> Result<Box<dyn AudioSink>> {
        let stream = OutputStreamBuilder::open_default_stream()?;
        let sink = Sink::connect_new(stream.mixer());

        Ok(Box::new(RodioSink {
            sink,
            _stream: stream,
        }))
    }
}
