//! Global pause/resume hotkey support.
//!
//! Registers a system-wide hotkey and publishes the toggled pause state on
//! a watch channel; the binary translates state changes into timer pause
//! and resume calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::{AwakeError, Result};

pub struct HotkeyManager {
    manager: GlobalHotKeyManager,
    is_paused: Arc<AtomicBool>,
    pause_sender: watch::Sender<bool>,
    pause_receiver: watch::Receiver<bool>,
}

impl HotkeyManager {
    pub fn new() -> Result<Self> {
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| AwakeError::hotkey(format!("failed to create hotkey manager: {e}")))?;
        let (pause_sender, pause_receiver) = watch::channel(false);

        Ok(Self {
            manager,
            is_paused: Arc::new(AtomicBool::new(false)),
            pause_sender,
            pause_receiver,
        })
    }

    pub fn register_pause_hotkey(&mut self, hotkey_str: &str) -> Result<()> {
        let hotkey = parse_hotkey(hotkey_str)?;

        self.manager
            .register(hotkey)
            .map_err(|e| AwakeError::hotkey(format!("failed to register '{hotkey_str}': {e}")))?;

        info!(hotkey = %hotkey_str, "global pause hotkey registered");
        Ok(())
    }

    pub fn pause_receiver(&self) -> watch::Receiver<bool> {
        self.pause_receiver.clone()
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused.load(Ordering::Relaxed)
    }

    /// Spawn the blocking listener that toggles the pause state on each
    /// hotkey press. The hotkey stays registered for as long as the
    /// listener task holds this `Arc`.
    pub fn start_listener(self: Arc<Self>) {
        let receiver = GlobalHotKeyEvent::receiver();

        tokio::task::spawn_blocking(move || loop {
            if let Ok(event) = receiver.try_recv() {
                if event.state == HotKeyState::Pressed {
                    let paused = !self.is_paused.load(Ordering::Relaxed);
                    self.is_paused.store(paused, Ordering::Relaxed);

                    if self.pause_sender.send(paused).is_err() {
                        warn!("pause state receiver dropped, stopping hotkey listener");
                        return;
                    }

                    if paused {
                        info!("paused via hotkey (press again to resume)");
                    } else {
                        info!("resumed via hotkey");
                    }
                }
            }

            // Small sleep to prevent busy waiting
            std::thread::sleep(Duration::from_millis(10));
        });
    }
}

fn parse_hotkey(hotkey_str: &str) -> Result<HotKey> {
    let binding = hotkey_str.to_lowercase();
    let mut modifiers = Modifiers::empty();
    let mut code = None;

    for part in binding.split('+').map(str::trim) {
        match part {
            "" => {
                return Err(AwakeError::hotkey(format!(
                    "empty token in hotkey '{hotkey_str}'"
                )))
            }
            "ctrl" | "control" => modifiers |= Modifiers::CONTROL,
            "alt" => modifiers |= Modifiers::ALT,
            "shift" => modifiers |= Modifiers::SHIFT,
            "meta" | "cmd" | "super" => modifiers |= Modifiers::SUPER,
            key => {
                if code.is_some() {
                    return Err(AwakeError::hotkey(format!(
                        "multiple keys specified in hotkey '{hotkey_str}'"
                    )));
                }
                code = Some(parse_code(key).ok_or_else(|| {
                    AwakeError::hotkey(format!("unsupported key '{key}' in hotkey '{hotkey_str}'"))
                })?);
            }
        }
    }

    let code = code
        .ok_or_else(|| AwakeError::hotkey(format!("no key specified in hotkey '{hotkey_str}'")))?;

    Ok(HotKey::new(Some(modifiers), code))
}

fn parse_code(key: &str) -> Option<Code> {
    use Code::*;

    let code = match key {
        "a" => KeyA,
        "b" => KeyB,
        "c" => KeyC,
        "d" => KeyD,
        "e" => KeyE,
        "f" => KeyF,
        "g" => KeyG,
        "h" => KeyH,
        "i" => KeyI,
        "j" => KeyJ,
        "k" => KeyK,
        "l" => KeyL,
        "m" => KeyM,
        "n" => KeyN,
        "o" => KeyO,
        "p" => KeyP,
        "q" => KeyQ,
        "r" => KeyR,
        "s" => KeyS,
        "t" => KeyT,
        "u" => KeyU,
        "v" => KeyV,
        "w" => KeyW,
        "x" => KeyX,
        "y" => KeyY,
        "z" => KeyZ,
        "0" => Digit0,
        "1" => Digit1,
        "2" => Digit2,
        "3" => Digit3,
        "4" => Digit4,
        "5" => Digit5,
        "6" => Digit6,
        "7" => Digit7,
        "8" => Digit8,
        "9" => Digit9,
        "f1" => F1,
        "f2" => F2,
        "f3" => F3,
        "f4" => F4,
        "f5" => F5,
        "f6" => F6,
        "f7" => F7,
        "f8" => F8,
        "f9" => F9,
        "f10" => F10,
        "f11" => F11,
        "f12" => F12,
        "space" => Space,
        "enter" | "return" => Enter,
        "tab" => Tab,
        "escape" | "esc" => Escape,
        "pause" => Pause,
        _ => return None,
    };

    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hotkey_with_modifiers() {
        let hotkey = parse_hotkey("ctrl+alt+p").unwrap();
        let expected = HotKey::new(Some(Modifiers::CONTROL | Modifiers::ALT), Code::KeyP);
        assert_eq!(hotkey, expected);
    }

    #[test]
    fn test_parse_hotkey_is_case_insensitive() {
        let lower = parse_hotkey("ctrl+shift+f5").unwrap();
        let upper = parse_hotkey("Ctrl+Shift+F5").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_parse_hotkey_bare_key() {
        let hotkey = parse_hotkey("pause").unwrap();
        assert_eq!(hotkey, HotKey::new(Some(Modifiers::empty()), Code::Pause));
    }

    #[test]
    fn test_parse_hotkey_rejects_malformed() {
        assert!(parse_hotkey("").is_err());
        assert!(parse_hotkey("ctrl+").is_err());
        assert!(parse_hotkey("ctrl+alt").is_err());
        assert!(parse_hotkey("a+b").is_err());
        assert!(parse_hotkey("ctrl+definitely_not_a_key").is_err());
    }
}
