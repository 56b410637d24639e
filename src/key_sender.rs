//! Key press simulation.
//!
//! The timer core only depends on the [`KeyPress`] trait; [`KeySender`] is
//! the real implementation, using `SendInput` on Windows. Other platforms
//! report [`AwakeError::UnsupportedPlatform`] when a press is attempted,
//! matching the current platform support (Linux planned).

use crate::error::{AwakeError, Result};

/// Capability to perform a single simulated key press.
///
/// Implemented by [`KeySender`] for real presses and by test doubles in the
/// integration tests.
pub trait KeyPress: Send + Sync {
    /// Press and release the given key once.
    fn press_key(&self, key: &str) -> Result<()>;
}

/// Sends simulated key presses to the operating system.
#[derive(Debug, Clone, Default)]
pub struct KeySender;

impl KeySender {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }

    /// Check that a key name is recognized without pressing it.
    pub fn parse_key_for_validation(&self, key: &str) -> Result<()> {
        virtual_key(key).map(|_| ())
    }
}

impl KeyPress for KeySender {
    fn press_key(&self, key: &str) -> Result<()> {
        let vk = virtual_key(key)?;

        #[cfg(windows)]
        {
            press_and_release(key, vk)
        }

        #[cfg(not(windows))]
        {
            let _ = vk;
            Err(AwakeError::unsupported_platform(format!(
                "key simulation for '{key}' is only implemented on Windows"
            )))
        }
    }
}

/// Map a key name to its Windows virtual-key code. Also serves as key-name
/// validation on every platform.
fn virtual_key(key: &str) -> Result<u16> {
    let normalized = key.trim().to_lowercase();
    let bytes = normalized.as_bytes();

    let vk = match normalized.as_str() {
        "shift" => 0x10,
        "ctrl" | "control" => 0x11,
        "alt" => 0x12,
        "backspace" => 0x08,
        "tab" => 0x09,
        "enter" | "return" => 0x0D,
        "escape" | "esc" => 0x1B,
        "space" => 0x20,
        "pageup" => 0x21,
        "pagedown" => 0x22,
        "end" => 0x23,
        "home" => 0x24,
        "left" | "arrowleft" => 0x25,
        "up" | "arrowup" => 0x26,
        "right" | "arrowright" => 0x27,
        "down" | "arrowdown" => 0x28,
        "insert" => 0x2D,
        "delete" => 0x2E,
        // Letters and digits map directly onto their ASCII uppercase codes.
        _ if bytes.len() == 1 && bytes[0].is_ascii_lowercase() => {
            (bytes[0] - b'a') as u16 + 0x41
        }
        _ if bytes.len() == 1 && bytes[0].is_ascii_digit() => bytes[0] as u16,
        _ => {
            if let Some(n) = normalized
                .strip_prefix('f')
                .and_then(|n| n.parse::<u16>().ok())
            {
                // F13..F24 exist as virtual keys and are popular for
                // keep-awake use since they rarely collide with shortcuts.
                if (1..=24).contains(&n) {
                    return Ok(0x6F + n);
                }
            }
            return Err(AwakeError::invalid_key(key, "unknown key"));
        }
    };

    Ok(vk)
}

#[cfg(windows)]
fn press_and_release(key: &str, vk: u16) -> Result<()> {
    use std::mem;
    use winapi::um::winuser::{SendInput, INPUT, INPUT_KEYBOARD, KEYEVENTF_KEYUP};

    unsafe {
        let mut inputs: [INPUT; 2] = mem::zeroed();
        for (input, flags) in inputs.iter_mut().zip([0, KEYEVENTF_KEYUP]) {
            input.type_ = INPUT_KEYBOARD;
            let ki = input.u.ki_mut();
            ki.wVk = vk;
            ki.dwFlags = flags;
        }

        let sent = SendInput(2, inputs.as_mut_ptr(), mem::size_of::<INPUT>() as i32);
        if sent != 2 {
            return Err(AwakeError::key_press_failed(
                key,
                "SendInput rejected the event",
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_key_named_keys() {
        assert_eq!(virtual_key("shift").unwrap(), 0x10);
        assert_eq!(virtual_key("ctrl").unwrap(), 0x11);
        assert_eq!(virtual_key("space").unwrap(), 0x20);
        assert_eq!(virtual_key("enter").unwrap(), 0x0D);
        assert_eq!(virtual_key("ESC").unwrap(), 0x1B);
    }

    #[test]
    fn test_virtual_key_letters_and_digits() {
        assert_eq!(virtual_key("a").unwrap(), 0x41);
        assert_eq!(virtual_key("Z").unwrap(), 0x5A);
        assert_eq!(virtual_key("0").unwrap(), 0x30);
        assert_eq!(virtual_key("9").unwrap(), 0x39);
    }

    #[test]
    fn test_virtual_key_function_keys() {
        assert_eq!(virtual_key("f1").unwrap(), 0x70);
        assert_eq!(virtual_key("f12").unwrap(), 0x7B);
        assert_eq!(virtual_key("f15").unwrap(), 0x7E);
        assert!(virtual_key("f25").is_err());
    }

    #[test]
    fn test_virtual_key_rejects_unknown() {
        assert!(virtual_key("").is_err());
        assert!(virtual_key("not_a_key").is_err());
        assert!(virtual_key("ab").is_err());
    }
}
