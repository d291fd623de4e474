//! Ring buffer sink for feeding another thread

use std::thread::sleep;
use std::time::Duration;

use rtrb::Producer;
use tracing::debug;

use crate::buffer::PcmFormat;
use crate::error::{Error, Result};
use crate::sink::{ensure_mono_i8, PlaybackSink};

/// How long a blocked write or drain sleeps before looking again
pub(crate) const POLL_INTERVAL: Duration = Duration::from_micros(500);

/// Per-line bookkeeping for an [`RtrbSink`]
#[derive(Debug, Default)]
pub struct RtrbLine {
    written: usize,
}

impl RtrbLine {
    /// Samples pushed on this line so far
    #[inline]
    pub fn written(&self) -> usize {
        self.written
    }
}

/// A sink that pushes samples into an rtrb ring buffer
///
/// The consumer half can live on any thread, e.g. a device callback or a
/// recorder. Writes block while the ring is full; drain blocks until the
/// consumer has emptied it.
pub struct RtrbSink {
    producer: Producer<i8>,
    /// The format of the currently open line, if any
    open: Option<PcmFormat>,
}

impl RtrbSink {
    pub fn new(producer: Producer<i8>) -> Self {
        Self { producer, open: None }
    }

    /// Returns how many sample slots are free
    #[inline]
    pub fn available(&self) -> usize {
        self.producer.slots()
    }

    /// Returns the producer, e.g. to hand it to a new sink
    pub fn into_producer(self) -> Producer<i8> {
        self.producer
    }
}

impl PlaybackSink for RtrbSink {
    type Line = RtrbLine;

    fn open(&mut self, format: &PcmFormat) -> Result<RtrbLine> {
        ensure_mono_i8(format)?;
        if self.open.is_some() {
            return Err(Error::device("ring buffer already has an open line"));
        }
        if self.producer.is_abandoned() {
            return Err(Error::device("ring buffer consumer was dropped"));
        }
        self.open = Some(*format);
        Ok(RtrbLine::default())
    }

    fn write(&mut self, line: &mut RtrbLine, samples: &[i8]) -> Result<usize> {
        let n = push_blocking(&mut self.producer, samples)?;
        line.written += n;
        Ok(n)
    }

    fn drain(&mut self, _line: &mut RtrbLine) -> Result<()> {
        drain_blocking(&self.producer)
    }

    fn close(&mut self, line: RtrbLine) {
        debug!(written = line.written, "ring buffer line closed");
        self.open = None;
    }
}

/// Push as much of `samples` as fits, waiting until at least one slot is free.
pub(crate) fn push_blocking(producer: &mut Producer<i8>, samples: &[i8]) -> Result<usize> {
    if samples.is_empty() {
        return Ok(0);
    }

    while producer.slots() == 0 {
        if producer.is_abandoned() {
            return Err(Error::device("ring buffer consumer was dropped"));
        }
        sleep(POLL_INTERVAL);
    }

    let n = producer.slots().min(samples.len());
    let mut pushed = 0;
    for &sample in &samples[..n] {
        if producer.push(sample).is_err() {
            break;
        }
        pushed += 1;
    }
    Ok(pushed)
}

/// Wait until the consumer has taken everything in the ring.
pub(crate) fn drain_blocking(producer: &Producer<i8>) -> Result<()> {
    let capacity = producer.buffer().capacity();
    while producer.slots() < capacity {
        if producer.is_abandoned() {
            // nobody left to play the rest
            return Ok(());
        }
        sleep(POLL_INTERVAL);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtrb::RingBuffer;

    #[test]
    fn write_takes_what_fits() {
        let (producer, mut consumer) = RingBuffer::new(4);
        let mut sink = RtrbSink::new(producer);
        let mut line = sink.open(&PcmFormat::mono_i8(8000)).unwrap();

        let n = sink.write(&mut line, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(n, 4);
        assert_eq!(line.written(), 4);
        assert_eq!(consumer.pop(), Ok(1));

        consumer.pop().unwrap();
        consumer.pop().unwrap();
        consumer.pop().unwrap();
        sink.drain(&mut line).unwrap();
        sink.close(line);
        assert_eq!(sink.available(), 4);
    }

    #[test]
    fn second_open_is_rejected() {
        let (producer, _consumer) = RingBuffer::new(4);
        let mut sink = RtrbSink::new(producer);
        let line = sink.open(&PcmFormat::mono_i8(8000)).unwrap();
        assert!(matches!(sink.open(&PcmFormat::mono_i8(8000)), Err(Error::DeviceUnavailable { .. })));
        sink.close(line);
        assert!(sink.open(&PcmFormat::mono_i8(8000)).is_ok());
    }

    #[test]
    fn dropped_consumer_is_a_device_error() {
        let (producer, consumer) = RingBuffer::new(2);
        let mut sink = RtrbSink::new(producer);
        let mut line = sink.open(&PcmFormat::mono_i8(8000)).unwrap();
        drop(consumer);

        assert_eq!(sink.write(&mut line, &[1, 2]).unwrap(), 2);
        assert!(matches!(sink.write(&mut line, &[3]), Err(Error::DeviceUnavailable { .. })));
        // drain doesn't hang once the consumer is gone
        sink.drain(&mut line).unwrap();
        sink.close(line);
    }
}
