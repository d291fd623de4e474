//! Play an image through the default audio device
//!
//! Run with: cargo run --example sonify_image --features cpal_sink,image_src -- picture.png
//!
//! The image is converted to grayscale, scaled to the session's matrix size
//! and compressed to 16 levels. Press Enter to stop between chunks; the
//! line is still drained and closed. Ctrl+C exits without closing it.

use std::path::PathBuf;

use clap::Parser;

use bildklang::sink::CpalSink;
use bildklang::{acquire, CancelToken, PlaybackOutcome, Session, SessionConfig};

#[derive(Parser, Debug)]
#[command(about = "Sonify an image: rows become frequencies, pixels become amplitudes")]
struct Args {
    /// Image file to play
    image: PathBuf,

    /// Matrix rows (frequencies)
    #[arg(long, default_value_t = 64)]
    rows: usize,

    /// Matrix columns (frames)
    #[arg(long, default_value_t = 64)]
    cols: usize,

    /// Lowest frequency in Hz (bottom row)
    #[arg(long, default_value_t = 200.0)]
    min_freq: f64,

    /// Highest frequency in Hz (top row)
    #[arg(long, default_value_t = 4000.0)]
    max_freq: f64,

    #[arg(long, default_value_t = 44_100)]
    sample_rate: u32,

    /// Quantization levels after compression
    #[arg(long, default_value_t = 16)]
    levels: u16,

    /// How many times to play the image
    #[arg(long, default_value_t = 1)]
    repeat: usize,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = SessionConfig::default()
        .with_dimensions(args.rows, args.cols)
        .with_frequency_range(args.min_freq, args.max_freq)
        .with_sample_rate(args.sample_rate)
        .with_max_level(args.levels.saturating_sub(1).max(1))
        .with_normalized_levels();

    let mut session = match Session::new(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };

    let matrix = match acquire::load_for_session(&args.image, &config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("couldn't load {}: {}", args.image.display(), e);
            return;
        }
    };
    println!("{}", matrix);

    let buffer = match session.synthesize(&matrix) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    println!("{} samples, {:.2?}", buffer.len(), buffer.duration());

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        std::thread::spawn(move || {
            let mut line = String::new();
            println!("Press Enter to stop");
            let _ = std::io::stdin().read_line(&mut line);
            cancel.cancel();
        });
    }

    let mut sink = CpalSink::default_output();
    for _ in 0..args.repeat {
        match session.play(&buffer, &mut sink, &cancel) {
            Ok(PlaybackOutcome::Completed { .. }) => {}
            Ok(PlaybackOutcome::Cancelled { written }) => {
                println!("stopped after {} samples", written);
                break;
            }
            Err(e) => {
                eprintln!("playback failed: {}", e);
                break;
            }
        }
    }
}
