//! Beat Flash Library
//!
//! Listens to a live audio input, detects percussive beats from block
//! energy against an adaptive average, and turns them into a timed flash.
//! Gain and sensitivity can be nudged while running.

pub mod audio;
pub mod config;
pub mod controls;
pub mod params;
pub mod state;

use audio::{AudioCaptureHandle, BeatPipeline, CaptureError, CaptureQueue};
use config::{BeatConfig, ConfigError};
use controls::{Control, ControlSteps};
use params::{ParameterSnapshot, ParameterStore};
use state::{ControlOverlay, FlashWindow};

use std::io::BufRead;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use thiserror::Error;

/// Top-level startup failures
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Sources(#[from] audio::SourceError),

    #[error("Thread error: {0}")]
    Thread(String),
}

/// Command-line options
#[derive(Debug, Default, PartialEq)]
pub struct Options {
    pub config_path: Option<String>,
    pub list_sources: bool,
}

impl Options {
    /// Parse `[--list-sources] [config.json]`
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Self {
        let mut options = Options::default();
        for arg in args {
            if arg == "--list-sources" || arg == "-l" {
                options.list_sources = true;
            } else {
                options.config_path = Some(arg);
            }
        }
        options
    }
}

/// Run the beat flasher until quit or end of input
pub fn run() -> Result<(), AppError> {
    env_logger::init();

    let options = Options::parse(std::env::args().skip(1));

    if options.list_sources {
        for source in audio::list_sources()? {
            println!("{:<40} {}", source.id, source.name);
        }
        return Ok(());
    }

    let config = match &options.config_path {
        Some(path) => BeatConfig::load(path)?,
        None => {
            let config = BeatConfig::default();
            config.validate()?;
            config
        }
    };

    let queue = Arc::new(CaptureQueue::new(config.queue_capacity));
    let params = Arc::new(ParameterStore::from_config(&config));
    let mut pipeline = BeatPipeline::new(&config, queue.clone(), params.clone());

    let mut capture = AudioCaptureHandle::start(config.source_id.clone(), queue.clone())?;

    let steps = ControlSteps {
        gain_db: config.gain_step_db,
        sensitivity: config.sens_step,
    };
    let controls_rx = spawn_input_thread(params.clone(), steps)?;

    let mut flash = FlashWindow::new(config.flash_duration());
    let mut overlay = ControlOverlay::new(
        config.bar_timeout(),
        params.gain_range(),
        params.sensitivity_range(),
    );

    let period = config.poll_period();
    let mut was_lit = false;

    log::info!(
        "Listening: block {} samples, history {} blocks, min interval {:?}",
        config.block_size,
        config.history_length,
        config.min_interval()
    );

    'main: loop {
        let now = Instant::now();

        loop {
            match controls_rx.try_recv() {
                Ok(Control::Quit) | Err(mpsc::TryRecvError::Disconnected) => break 'main,
                Ok(_) => {
                    overlay.touch(now);
                    print_overlay(&overlay, &params.snapshot());
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        let events = pipeline.poll();
        flash.observe(&events);

        let lit = flash.is_lit(Instant::now());
        if lit && !was_lit {
            println!("*** FLASH *** (energy {:.4})", pipeline.last_energy());
        }
        was_lit = lit;

        thread::sleep(period);
    }

    capture.stop();

    let stats = queue.stats().snapshot();
    log::info!(
        "Processed {} blocks from {} chunks ({} dropped, {} stream errors)",
        pipeline.blocks_processed(),
        stats.chunks_pushed,
        stats.chunks_dropped,
        stats.stream_errors
    );

    Ok(())
}

/// Read controls from stdin, apply them, and forward them to the main loop.
///
/// End of input is reported as `Quit`.
fn spawn_input_thread(
    params: Arc<ParameterStore>,
    steps: ControlSteps,
) -> Result<mpsc::Receiver<Control>, AppError> {
    let (tx, rx) = mpsc::channel();

    thread::Builder::new()
        .name("input".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Control>() {
                    Ok(control) => {
                        control.apply(&params, steps);
                        if tx.send(control).is_err() || control == Control::Quit {
                            return;
                        }
                    }
                    Err(e) => log::warn!("{}", e),
                }
            }
            let _ = tx.send(Control::Quit);
        })
        .map_err(|e| AppError::Thread(e.to_string()))?;

    Ok(rx)
}

fn print_overlay(overlay: &ControlOverlay, params: &ParameterSnapshot) {
    const WIDTH: usize = 30;
    let bar = |ratio: f32| {
        let filled = ((ratio * WIDTH as f32).round() as usize).min(WIDTH);
        format!("[{}{}]", "#".repeat(filled), " ".repeat(WIDTH - filled))
    };
    println!(
        "{:<22} {}",
        ControlOverlay::gain_label(params),
        bar(overlay.gain_ratio(params))
    );
    println!(
        "{:<22} {}",
        ControlOverlay::sensitivity_label(params),
        bar(overlay.sensitivity_ratio(params))
    );
}
