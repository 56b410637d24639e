use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use keep_awake::{Config, HotkeyManager, KeepAwake, KeySender};

/// Keep the computer awake by simulating key presses at a fixed interval.
#[derive(Parser, Debug)]
#[command(name = "kawake", version, about)]
struct Cli {
    /// Key to simulate (e.g. shift, ctrl, f15)
    key: Option<String>,

    /// Seconds between key presses
    #[arg(short, long)]
    interval: Option<u64>,

    /// Total duration of the simulation in seconds (unbounded if omitted)
    #[arg(short = 'r', long)]
    runtime: Option<u64>,

    /// Path to a JSON configuration file; explicit flags take precedence
    #[arg(short, long)]
    config: Option<String>,

    /// Global hotkey that toggles pause/resume (e.g. ctrl+alt+p)
    #[arg(long)]
    pause_hotkey: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(key) = self.key {
            config.key = key;
        }
        if let Some(secs) = self.interval {
            config.interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.runtime {
            config.run_time = Some(Duration::from_secs(secs));
        }
        if let Some(hotkey) = self.pause_hotkey {
            config.pause_hotkey = Some(hotkey);
        }
        config.verbose |= self.verbose;

        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("{} {err:#}", "error:".red().bold());
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.into_config()?;
    init_tracing(config.verbose);
    config.validate()?;

    let sender = KeySender::new()?;
    sender.parse_key_for_validation(&config.key)?;

    let mut timer = KeepAwake::new(&config, Arc::new(sender))?;

    if let Some(combo) = &config.pause_hotkey {
        let mut hotkeys = HotkeyManager::new()?;
        hotkeys.register_pause_hotkey(combo)?;
        let mut paused_rx = hotkeys.pause_receiver();
        Arc::new(hotkeys).start_listener();

        let handle = timer.handle();
        tokio::spawn(async move {
            while paused_rx.changed().await.is_ok() {
                if *paused_rx.borrow() {
                    handle.pause();
                } else {
                    handle.resume();
                }
            }
        });
    }

    let schedule = match config.run_time {
        Some(run_time) => format!(" for {}s", run_time.as_secs()),
        None => " until stopped".to_string(),
    };
    println!(
        "{} pressing '{}' every {}s{}",
        "kawake".green().bold(),
        config.key,
        config.interval.as_secs(),
        schedule
    );

    timer.start()?;

    // First Ctrl-C stops the run cooperatively (the loop notices within one
    // interval); a second one aborts outright.
    let stopper = timer.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after the current interval");
            stopper.stop();
            if tokio::signal::ctrl_c().await.is_ok() {
                process::exit(130);
            }
        }
    });

    timer.join().await?;
    info!(presses = timer.press_count(), "timer finished");
    Ok(())
}
