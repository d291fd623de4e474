//! CPAL audio output sink

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, SizedSample, SupportedStreamConfig};
use dasp_sample::Sample;
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, warn};

use crate::buffer::PcmFormat;
use crate::error::{Error, Result};
use crate::sink::rtrb_sink::{drain_blocking, push_blocking, POLL_INTERVAL};
use crate::sink::{ensure_mono_i8, PlaybackSink};

/// A sink that plays through a CPAL output device
///
/// Each line opens a fresh output stream at the line's sample rate. The
/// stream runs on CPAL's own thread and pulls samples from a ring buffer;
/// mono samples are copied to every device channel.
pub struct CpalSink {
    device: Option<cpal::Device>,
}

/// An open CPAL output stream and the ring buffer feeding it
pub struct CpalLine {
    stream: cpal::Stream,
    producer: Producer<i8>,
    /// Tracks how many frames CPAL has consumed
    frames_consumed: Arc<AtomicUsize>,
    /// Largest callback buffer seen, in frames
    max_callback_frames: Arc<AtomicUsize>,
    /// Tracks underrun state for diagnostics
    had_underrun: Arc<AtomicBool>,
    sample_rate: u32,
}

impl CpalLine {
    /// Returns how many frames have been played
    #[inline]
    pub fn frames_consumed(&self) -> usize {
        self.frames_consumed.load(Ordering::Relaxed)
    }

    /// Longest stretch of audio the device has asked for in one callback
    pub fn device_latency(&self) -> Duration {
        frames_to_duration(self.max_callback_frames.load(Ordering::Relaxed), self.sample_rate)
    }

    /// Check and clear the underrun flag
    pub fn check_underrun(&self) -> bool {
        self.had_underrun.swap(false, Ordering::Relaxed)
    }
}

impl CpalSink {
    /// Use the system's default output device.
    ///
    /// A missing device isn't an error until a line is opened.
    pub fn default_output() -> Self {
        let device = cpal::default_host().default_output_device();
        if let Some(name) = device.as_ref().and_then(|d| d.name().ok()) {
            debug!(device = %name, "using output device");
        }
        Self { device }
    }

    /// Use a specific device.
    pub fn with_device(device: cpal::Device) -> Self {
        Self { device: Some(device) }
    }

    /// Pick the device config with the fewest channels that can run at
    /// `sample_rate` in a sample format we can convert to.
    fn select_config(device: &cpal::Device, sample_rate: u32) -> Result<SupportedStreamConfig> {
        let ranges = device
            .supported_output_configs()
            .map_err(|e| Error::device(format!("couldn't query output configs: {}", e)))?;

        ranges
            .filter(|r| matches!(r.sample_format(), SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16))
            .filter(|r| r.min_sample_rate().0 <= sample_rate && sample_rate <= r.max_sample_rate().0)
            .min_by_key(|r| r.channels())
            .map(|r| r.with_sample_rate(SampleRate(sample_rate)))
            .ok_or_else(|| Error::device(format!("no output config supports {} Hz", sample_rate)))
    }
}

impl PlaybackSink for CpalSink {
    type Line = CpalLine;

    fn open(&mut self, format: &PcmFormat) -> Result<CpalLine> {
        ensure_mono_i8(format)?;
        let device = self
            .device
            .as_ref()
            .ok_or_else(|| Error::device("no output device available"))?;

        let config = Self::select_config(device, format.sample_rate)?;
        let channels = config.channels() as usize;
        let sample_format = config.sample_format();
        let stream_config = config.config();

        // Ring buffer sized for ~100ms of audio to handle scheduling jitter
        let buffer_size = ((format.sample_rate as usize) / 10).next_power_of_two().max(8192);
        let (producer, consumer) = RingBuffer::<i8>::new(buffer_size);

        let counters = StreamCounters::default();

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(device, &stream_config, channels, consumer, counters.clone()),
            SampleFormat::I16 => build_stream::<i16>(device, &stream_config, channels, consumer, counters.clone()),
            SampleFormat::U16 => build_stream::<u16>(device, &stream_config, channels, consumer, counters.clone()),
            other => return Err(Error::device(format!("unsupported sample format: {:?}", other))),
        }
        .map_err(|e| Error::device(format!("failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| Error::device(format!("failed to start output stream: {}", e)))?;

        debug!(sample_rate = format.sample_rate, channels, ?sample_format, "output stream started");

        Ok(CpalLine {
            stream,
            producer,
            frames_consumed: counters.frames_consumed,
            max_callback_frames: counters.max_callback_frames,
            had_underrun: counters.had_underrun,
            sample_rate: format.sample_rate,
        })
    }

    fn write(&mut self, line: &mut CpalLine, samples: &[i8]) -> Result<usize> {
        push_blocking(&mut line.producer, samples)
    }

    fn drain(&mut self, line: &mut CpalLine) -> Result<()> {
        drain_blocking(&line.producer)?;
        // the ring is empty but the last callback's buffer may still be playing
        std::thread::sleep(line.device_latency() + POLL_INTERVAL * 20);
        Ok(())
    }

    fn close(&mut self, line: CpalLine) {
        if line.check_underrun() {
            debug!("output stream ran dry at least once");
        }
        if let Err(e) = line.stream.pause() {
            warn!("couldn't pause output stream: {}", e);
        }
        debug!(
            frames = line.frames_consumed(),
            sample_rate = line.sample_rate,
            "output stream closed"
        );
    }
}

/// State shared between a line and its stream callback
#[derive(Clone, Default)]
struct StreamCounters {
    frames_consumed: Arc<AtomicUsize>,
    max_callback_frames: Arc<AtomicUsize>,
    had_underrun: Arc<AtomicBool>,
}

fn build_stream<T>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    channels: usize,
    mut consumer: Consumer<i8>,
    counters: StreamCounters,
) -> core::result::Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + Sample,
    i8: dasp_sample::ToSample<T>,
{
    let StreamCounters {
        frames_consumed,
        max_callback_frames,
        had_underrun,
    } = counters;

    device.build_output_stream(
        stream_config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let mut underrun = false;
            for frame in data.chunks_mut(channels) {
                let s = match consumer.pop() {
                    Ok(v) => v.to_sample::<T>(),
                    Err(_) => {
                        underrun = true;
                        T::EQUILIBRIUM
                    }
                };
                frame.iter_mut().for_each(|d| *d = s);
            }
            if underrun {
                had_underrun.store(true, Ordering::Relaxed);
            }
            let frames = data.len() / channels.max(1);
            frames_consumed.fetch_add(frames, Ordering::Relaxed);
            max_callback_frames.fetch_max(frames, Ordering::Relaxed);
        },
        |err| warn!("CPAL stream error: {:?}", err),
        None,
    )
}

fn frames_to_duration(frames: usize, sample_rate: u32) -> Duration {
    Duration::from_secs_f64(frames as f64 / f64::from(sample_rate.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_length_converts_to_playing_time() {
        assert_eq!(frames_to_duration(4410, 44_100), Duration::from_millis(100));
        assert_eq!(frames_to_duration(0, 44_100), Duration::ZERO);
        // a zero rate never divides by zero
        assert_eq!(frames_to_duration(8, 0), Duration::from_secs(8));
    }

    #[test]
    fn drain_waits_longer_than_the_largest_callback() {
        let counters = StreamCounters::default();
        counters.max_callback_frames.fetch_max(2048, Ordering::Relaxed);
        counters.max_callback_frames.fetch_max(512, Ordering::Relaxed);
        let frames = counters.max_callback_frames.load(Ordering::Relaxed);
        assert_eq!(frames, 2048);
        // 2048 frames at 44.1 kHz last about 46 ms
        assert!(frames_to_duration(frames, 44_100) > Duration::from_millis(40));
    }
}
