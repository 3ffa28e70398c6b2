use std::io::BufRead;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;
use ear_audio::capture::MicCapture;
use ear_audio::decode::FileDecoder;
use ear_audio::session::RecognitionSession;
use ear_core::EarConfig;

pub mod alerts;
pub mod cli;
pub mod events;
pub mod library;

const EVENT_LOG_CAPACITY: usize = 50;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    let config = resolve_config(&cli)?;
    let library = library::FileLibrary::load(&cli.library)?;
    log::info!(
        "{} sounds loaded from {}",
        library.sounds().len(),
        cli.library.display()
    );

    let capture = MicCapture::start(config.sample_rate)?;
    if capture.sample_rate() != config.sample_rate {
        log::info!(
            "device capture rate is {}Hz (requested {}Hz)",
            capture.sample_rate(),
            config.sample_rate
        );
    }

    let event_log = Arc::new(Mutex::new(events::EventLog::new(EVENT_LOG_CAPACITY)));
    let sink = alerts::ConsoleSink::new(Arc::clone(&event_log));

    let session = RecognitionSession::spawn(config, capture, FileDecoder, library, sink)?;
    if !cli.no_listen {
        session.listen();
    }

    println!("commands: listen | stop | recent | quit");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "listen" => session.listen(),
            "stop" => {
                session.stop();
                println!("stopping at the next cycle boundary");
            }
            "recent" => print_recent(&event_log),
            "quit" | "exit" => break,
            "" => {}
            other => println!("unknown command: {other}"),
        }
    }

    Ok(())
}

fn print_recent(event_log: &Arc<Mutex<events::EventLog>>) {
    let now = events::unix_now();
    if let Ok(log) = event_log.lock() {
        if log.recent().is_empty() {
            println!("nothing recognized yet");
            return;
        }
        for event in log.recent() {
            println!(
                "Sounds like {} ({})",
                event.sound_name,
                events::format_time_since(event.timestamp, now)
            );
        }
    }
}

/// Load `--config` when given, else defaults.
fn resolve_config(cli: &cli::Cli) -> Result<EarConfig> {
    match cli.config.as_deref() {
        Some(path) => ear_core::config::load_config(path),
        None => Ok(EarConfig::default()),
    }
}
