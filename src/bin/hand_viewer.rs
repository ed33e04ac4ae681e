use anyhow::Result;
use clap::Parser;
use std::time::{Duration, Instant};
use tracing::info;

use gesture_tracker::config::Config;
use gesture_tracker::render::{Key, MinifbRenderer};
use gesture_tracker::session::{FrameOutcome, HandSession};
use gesture_tracker::source::JsonLinesSource;

#[derive(Parser, Debug)]
#[command(name = "hand_viewer", about = "Debug view of the normalized hand and its orientation")]
struct Cli {
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Landmark recording (JSON Lines)
    #[arg(long)]
    input: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_tracker=info,hand_viewer=info".into()),
        )
        .init();

    let config = Config::load_or_default(&cli.config);
    let input = cli.input.unwrap_or_else(|| config.replay.path.clone());

    println!("Hand Viewer {}", env!("GIT_VERSION"));
    println!("操作: [R] 基準姿勢リセット  [Esc] 終了");
    println!();

    let source = JsonLinesSource::open(&input)?;
    let mut session = HandSession::new(source, &config)?;

    let width = config.frame.width as usize;
    let height = config.frame.height as usize;
    let mut renderer = MinifbRenderer::new("Hand Viewer", width, height)?;

    let fps = config.replay.target_fps.max(1);
    let frame_duration = Duration::from_secs_f64(1.0 / fps as f64);
    let working_scale = config.orientation.working_scale;

    while renderer.is_open() {
        let loop_start = Instant::now();

        if renderer.is_key_pressed(Key::R) {
            session.reset();
            info!("reference pose reset");
        }

        let outcome = match session.step()? {
            Some(o) => o,
            None => break,
        };

        {
            let mut canvas = renderer.canvas()?;
            canvas.clear(0);

            if let FrameOutcome::Hand { landmarks, frame } = &outcome {
                let normalizer = session.normalizer();

                let mut working = frame.normalized.scaled.clone();
                normalizer.transform().scale(&mut working, working_scale);
                canvas.draw_all_hand_transformed(&working);

                if let Some(reference) = normalizer.reference() {
                    canvas.draw_fixed_hand(
                        normalizer.transform(),
                        reference,
                        &frame.orientation,
                        config.debug.hand_scale,
                    )?;
                }
                canvas.draw_orientation_vector(landmarks)?;

                let o = &frame.orientation;
                info!(
                    roll = o.roll,
                    yaw = o.yaw,
                    pitch = o.pitch,
                    z = frame.depth,
                    "hand"
                );
            }
        }
        renderer.update()?;

        if let Some(rest) = frame_duration.checked_sub(loop_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    println!("Shutting down...");
    Ok(())
}
