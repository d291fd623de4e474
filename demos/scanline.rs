//! Synthesize a diagonal line and stream it through a ring buffer
//!
//! Run with: cargo run --example scanline
//!
//! No audio device needed: a consumer thread plays the part of the device,
//! pulling samples out of the ring buffer at roughly real-time speed and
//! printing the peak level of every frame.

use std::thread;
use std::time::Duration;

use rtrb::RingBuffer;

use bildklang::sink::RtrbSink;
use bildklang::{CancelToken, PixelMatrix, Session, SessionConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = SessionConfig::default()
        .with_dimensions(16, 16)
        .with_sample_rate(8_000)
        .with_max_level(15)
        .with_normalized_levels()
        .with_chunk_size(256);

    let mut session = Session::new(config).expect("valid config");

    // a falling tone: top-left to bottom-right
    let mut matrix = PixelMatrix::zeros(16, 16).expect("non-empty");
    for i in 0..16 {
        matrix.set(i, i, 15);
    }
    print!("{}", matrix);

    let buffer = session.synthesize(&matrix).expect("matrix fits the session");
    let frame_len = session.samples_per_frame();

    let (producer, mut consumer) = RingBuffer::<i8>::new(1024);
    let reader = thread::spawn(move || {
        let mut frame = Vec::with_capacity(frame_len);
        let tick = Duration::from_secs_f64(64.0 / 8_000.0);
        loop {
            let n = consumer.slots().min(64);
            if n == 0 {
                if consumer.is_abandoned() {
                    break;
                }
            } else if let Ok(chunk) = consumer.read_chunk(n) {
                for s in chunk {
                    frame.push(s);
                    if frame.len() == frame_len {
                        let peak = frame.iter().map(|s: &i8| s.unsigned_abs()).max().unwrap_or(0);
                        println!("{:>3} {}", peak, "#".repeat(peak as usize / 4));
                        frame.clear();
                    }
                }
            }
            thread::sleep(tick);
        }
    });

    let mut sink = RtrbSink::new(producer);
    let outcome = session.play(&buffer, &mut sink, &CancelToken::new());
    println!("{:?}", outcome);

    drop(sink);
    reader.join().expect("reader thread panicked");
}
