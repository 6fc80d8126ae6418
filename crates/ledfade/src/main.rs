//! ledfade: fade a WS2812 LED strip through a sequence of colors.
//!
//! One-shot: acquires the strip lock, renders every transition, tears down,
//! and exits. Concurrent invocations on the same host queue up behind the
//! lock marker.

use std::path::PathBuf;

use clap::Parser;

use ledfade_lib::color::{Color, parse_color};
use ledfade_lib::config::Config;
use ledfade_lib::error::Result;
use ledfade_lib::fade::{FadePlan, Sequencer};
use ledfade_lib::lock::{LockConfig, StripLock};
use ledfade_lib::strip::{LedStrip, StripConfig};

#[derive(Parser)]
#[command(
    name = "ledfade",
    version,
    about = "Fade a WS2812 LED strip through a sequence of colors",
    after_help = "Each color is an RGB hex value of the form 0xFF1100.\n\
                  The strip takes one second to transition between each color pair."
)]
struct Args {
    /// Colors to fade through, in order (e.g. 0xFF1100 0x000000)
    #[arg(required = true, num_args = 1.., value_parser = parse_color)]
    colors: Vec<Color>,

    /// Read strip settings from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[cfg(feature = "ws281x")]
fn open_strip(config: &StripConfig) -> Result<Box<dyn LedStrip>> {
    let strip = ledfade_lib::strip::ws281x::Ws281xStrip::open(config)?;
    Ok(Box::new(strip))
}

#[cfg(not(feature = "ws281x"))]
fn open_strip(_config: &StripConfig) -> Result<Box<dyn LedStrip>> {
    Err(ledfade_lib::strip::StripError::Unsupported(
        "built without a strip driver, rebuild with --features ws281x".into(),
    )
    .into())
}

fn run(args: &Args) -> Result<()> {
    // A bad plan must be rejected before the lock or the hardware is touched.
    let plan = FadePlan::new(args.colors.clone())?;

    let config = match &args.config {
        Some(path) => {
            let (config, warnings) = Config::load_from(path);
            for w in &warnings {
                log::warn!("{w}");
            }
            config
        }
        None => Config::load(),
    };

    let lock = StripLock::acquire(&LockConfig::default())?;
    let mut strip = open_strip(&config.strip)?;

    log::info!(
        "fading {} leds through {} colors",
        config.strip.led_count,
        plan.waypoints().len()
    );
    // On abort the marker stays behind, like any crashed holder would leave it.
    Sequencer::with_defaults().run(&plan, &mut strip)?;

    strip.shutdown();
    lock.release()?;
    Ok(())
}

fn main() {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
