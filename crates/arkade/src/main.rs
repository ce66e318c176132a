use anyhow::Context;
use arkade::config::{self, Profile};
use arkade::events::AppEvent;
use arkade::pipeline::GesturePipeline;
use arkade::sink::LogSink;
use arkade::sys::runtime;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

/// Replays recorded hand landmarks through the gesture pipeline and logs
/// what the installation would show.
#[derive(Parser, Debug)]
#[command(name = "arkade", version)]
struct Cli {
    /// JSON-lines landmark recording.
    #[arg(required_unless_present = "write_config")]
    recording: Option<PathBuf>,

    /// Preset the configuration file is layered over.
    #[arg(short, long, default_value_t = Profile::Main)]
    profile: Profile,

    /// Calibrate the hand distance range during the first seconds.
    #[arg(long)]
    calibrate: bool,

    /// Accept frames immediately instead of waiting for the tracker to settle.
    #[arg(long)]
    no_warmup: bool,

    /// Write the default config file and exit.
    #[arg(long)]
    write_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.write_config {
        let path = config::write_default_config().context("Failed to write default config")?;
        println!("{}", path.display());
        return Ok(());
    }

    let recording = cli.recording.context("No recording given")?;
    let load = |config: config::Config| {
        let mut config = config;
        if cli.no_warmup {
            config.tracking.warmup_ms = 0.0;
        }
        config
    };

    let clock = Instant::now();
    let now = || clock.elapsed().as_secs_f64() * 1000.0;

    let mut pipeline =
        GesturePipeline::new(load(config::load_or_default(cli.profile)), LogSink::default(), now());
    if cli.calibrate {
        pipeline.start_calibration(now());
    }

    let (tx, rx) = async_channel::bounded(32);
    runtime::start_background_services(tx, recording);

    while let Ok(event) = rx.recv_blocking() {
        match event {
            AppEvent::Frame(frame) => {
                for event in pipeline.on_frame(frame, now()).events {
                    log::debug!("{:?}", event);
                }
            }
            AppEvent::Tick => {
                for event in pipeline.on_tick(now()) {
                    log::debug!("{:?}", event);
                }
            }
            AppEvent::ConfigReload => match config::load_config(cli.profile) {
                Ok(c) => pipeline.reconfigure(load(c)),
                Err(e) => log::error!("Keeping current config, reload failed: {}", e),
            },
            AppEvent::ReplayFinished => {
                log::info!("Replay finished in {} mode", pipeline.mode());
                break;
            }
        }
    }

    Ok(())
}
