use anyhow::Result;
use clap::Parser;
use std::time::{Duration, Instant};
use tracing::info;

use gesture_tracker::config::Config;
use gesture_tracker::session::{FrameOutcome, HandSession};
use gesture_tracker::source::JsonLinesSource;

#[derive(Parser, Debug)]
#[command(name = "gesture-tracker", about = "Replay hand landmarks and estimate roll/yaw/pitch/depth")]
struct Cli {
    /// Config file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Landmark recording (JSON Lines); overrides replay.path
    #[arg(long)]
    input: Option<String>,

    /// Replay rate; 0 runs as fast as possible
    #[arg(long)]
    fps: Option<u32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_tracker=info".into()),
        )
        .init();

    let config = Config::load_or_default(&cli.config);
    let input = cli.input.unwrap_or_else(|| config.replay.path.clone());
    let fps = cli.fps.unwrap_or(config.replay.target_fps);

    println!("Gesture Tracker {}", env!("GIT_VERSION"));
    println!("Input: {}", input);
    println!("Frame: {}x{}", config.frame.width, config.frame.height);
    println!("Replay FPS: {}", if fps == 0 { "unlimited".to_string() } else { fps.to_string() });
    println!();

    let source = JsonLinesSource::open(&input)?;
    let mut session = HandSession::new(source, &config)?;

    let frame_duration = (fps > 0).then(|| Duration::from_secs_f64(1.0 / fps as f64));

    // FPS計測
    let mut frame_count = 0u32;
    let mut hand_count = 0u32;
    let mut fps_timer = Instant::now();
    let mut t_pipeline = 0.0f64;

    loop {
        let loop_start = Instant::now();

        let outcome = match session.step()? {
            Some(o) => o,
            None => break,
        };
        let t_step = loop_start.elapsed().as_secs_f64() * 1000.0;

        if let FrameOutcome::Hand { frame, .. } = &outcome {
            let o = &frame.orientation;
            println!(
                "roll {:7.2}  yaw {:7.2}  pitch {:7.2}  z {:8.3}",
                o.roll, o.yaw, o.pitch, frame.depth
            );
            hand_count += 1;
            t_pipeline += t_step;
        }

        // FPS表示
        frame_count += 1;
        let elapsed = fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            let avg = if hand_count > 0 { t_pipeline / hand_count as f64 } else { 0.0 };
            info!(
                "FPS: {:.1} (hand: {}) | pipeline {:.3}ms",
                frame_count as f32 / elapsed,
                hand_count,
                avg
            );
            frame_count = 0;
            hand_count = 0;
            t_pipeline = 0.0;
            fps_timer = Instant::now();
        }

        if let Some(d) = frame_duration {
            if let Some(rest) = d.checked_sub(loop_start.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }

    let (frames, hands) = session.counts();
    println!();
    println!("Frames: {}  Hands: {}", frames, hands);
    if session.normalizer().has_reference() {
        println!("Last depth: {:.3}", session.normalizer().zcoord());
    }
    Ok(())
}
