//! Key event resolution.
//!
//! Turns a physical key press into the ordered list of key combination
//! strings to probe against the registry. The dispatcher takes the first
//! candidate that is registered, so the order here is the whole contract:
//! the literal delivered key comes first, normalized aliases after it.
//!
//! Keyboards deliver shift-adjusted characters (`A`, `!`) for printable keys
//! but leave the character alone when ctrl is held, and the digit row yields
//! symbols under shift. Hotkeys may therefore be registered as either
//! `"!"`, `"shift+!"` or `"shift+1"`, and all three must resolve.

use std::fmt;

/// Symbols produced by shift + digit on a standard keyboard, indexed by digit.
pub const SHIFTED_DIGITS: [char; 10] = [')', '!', '@', '#', '$', '%', '^', '&', '*', '('];

/// A single key-down as reported by the host. Alt and meta are not tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    /// Printable character or named key such as `"Enter"`
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            shift: false,
            ctrl: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }
}

impl fmt::Display for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        f.write_str(&self.key)
    }
}

/// The digit whose shifted form is `key`, if `key` is one of [`SHIFTED_DIGITS`].
pub fn shifted_digit(key: &str) -> Option<char> {
    let mut chars = key.chars();
    let symbol = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    SHIFTED_DIGITS
        .iter()
        .position(|&c| c == symbol)
        .and_then(|digit| char::from_digit(digit as u32, 10))
}

/// Candidate combination strings for `press`, most literal first.
pub fn candidates(press: &KeyPress) -> Vec<String> {
    let key = press.key.as_str();

    let candidates = if press.shift && press.ctrl {
        let upper = key.to_uppercase();
        let mut out = vec![format!("ctrl+shift+{upper}"), format!("shift+ctrl+{upper}")];
        match shifted_digit(key) {
            Some(digit) => {
                out.push(format!("ctrl+shift+{digit}"));
                out.push(format!("shift+ctrl+{digit}"));
            }
            None => {
                let lower = key.to_lowercase();
                out.push(format!("ctrl+shift+{lower}"));
                out.push(format!("shift+ctrl+{lower}"));
            }
        }
        out
    } else if let Some(digit) = shifted_digit(key) {
        // The symbol already implies shift, whatever the flags say.
        vec![key.to_string(), format!("shift+{key}"), format!("shift+{digit}")]
    } else if press.shift {
        vec![
            key.to_string(),
            format!("shift+{}", key.to_uppercase()),
            format!("shift+{}", key.to_lowercase()),
        ]
    } else if press.ctrl {
        vec![format!("ctrl+{key}")]
    } else {
        vec![key.to_string()]
    };

    tracing::trace!(press = %press, ?candidates, "resolved key candidates");
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shifted_digit_table() {
        assert_eq!(shifted_digit(")"), Some('0'));
        assert_eq!(shifted_digit("!"), Some('1'));
        assert_eq!(shifted_digit("@"), Some('2'));
        assert_eq!(shifted_digit("("), Some('9'));
        assert_eq!(shifted_digit("1"), None);
        assert_eq!(shifted_digit("!!"), None);
        assert_eq!(shifted_digit(""), None);
    }

    #[test]
    fn test_no_modifiers_is_literal() {
        assert_eq!(candidates(&KeyPress::new("f")), vec!["f"]);
        assert_eq!(candidates(&KeyPress::new("Enter")), vec!["Enter"]);
    }

    #[test]
    fn test_shift_prefers_upper_then_lower() {
        assert_eq!(
            candidates(&KeyPress::new("a").with_shift()),
            vec!["a", "shift+A", "shift+a"]
        );
    }

    #[test]
    fn test_shifted_digit_symbol() {
        assert_eq!(
            candidates(&KeyPress::new("!").with_shift()),
            vec!["!", "shift+!", "shift+1"]
        );
        // Branch applies even if the host did not report shift.
        assert_eq!(
            candidates(&KeyPress::new(")")),
            vec![")", "shift+)", "shift+0"]
        );
    }

    #[test]
    fn test_ctrl_only_drops_literal() {
        assert_eq!(candidates(&KeyPress::new("s").with_ctrl()), vec!["ctrl+s"]);
        // No case normalization under ctrl alone.
        assert_eq!(candidates(&KeyPress::new("S").with_ctrl()), vec!["ctrl+S"]);
    }

    #[test]
    fn test_ctrl_shift_letter_order() {
        assert_eq!(
            candidates(&KeyPress::new("k").with_shift().with_ctrl()),
            vec!["ctrl+shift+K", "shift+ctrl+K", "ctrl+shift+k", "shift+ctrl+k"]
        );
    }

    #[test]
    fn test_ctrl_shift_digit_symbol() {
        assert_eq!(
            candidates(&KeyPress::new("@").with_shift().with_ctrl()),
            vec!["ctrl+shift+@", "shift+ctrl+@", "ctrl+shift+2", "shift+ctrl+2"]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(KeyPress::new("k").with_shift().with_ctrl().to_string(), "Ctrl+Shift+k");
    }
}
