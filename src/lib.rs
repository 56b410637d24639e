//! # Keep Awake
//!
//! A command-line tool that keeps the computer awake by simulating a key
//! press at a fixed interval, for a bounded or unbounded duration.
//!
//! ## Features
//!
//! - Periodic key press on a background task
//! - Bounded or unbounded run time
//! - Pause, resume, reset and stop from other tasks
//! - Optional global hotkey for pause/resume
//! - JSON configuration file support
//! - Cross-platform core with Windows key simulation (Linux planned)
//!
//! ## Example
//!
//! ```no_run
//! use keep_awake::{Config, KeepAwake, KeySender};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn demo() -> keep_awake::Result<()> {
//! let config = Config {
//!     key: "shift".to_string(),
//!     interval: Duration::from_secs(210),
//!     ..Config::default()
//! };
//!
//! let sender = Arc::new(KeySender::new()?);
//! let mut timer = KeepAwake::new(&config, sender)?;
//!
//! timer.start()?;
//! timer.join().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Configuration can be provided via JSON files:
//!
//! ```json
//! {
//!   "key": "f15",
//!   "interval": "210s",
//!   "run_time": "2m",
//!   "pause_hotkey": "ctrl+alt+p"
//! }
//! ```

pub mod config;
pub mod error;
pub mod hotkey;
pub mod key_sender;
pub mod timer;

pub use config::Config;
pub use error::{AwakeError, Result};
pub use hotkey::HotkeyManager;
pub use key_sender::{KeyPress, KeySender};
pub use timer::{KeepAwake, TimerHandle};
