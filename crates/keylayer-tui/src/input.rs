//! Translation of crossterm key events into hotkey key-downs.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use keylayer_core::{EventTarget, KeyDown, KeyPress};

/// Host key name for a crossterm key code, e.g. `'a'` → `"a"`, `Up` → `"ArrowUp"`.
pub fn key_name(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Tab | KeyCode::BackTab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => return None,
    };
    Some(name)
}

/// Build the key-down for a crossterm event. Releases yield nothing;
/// auto-repeats count as presses.
pub fn key_down_from_crossterm(event: &KeyEvent, target: EventTarget) -> Option<KeyDown> {
    if event.kind == KeyEventKind::Release {
        return None;
    }

    let mut press = KeyPress::new(key_name(event.code)?);
    // BackTab is how terminals report Shift+Tab
    press.shift = event.modifiers.contains(KeyModifiers::SHIFT) || event.code == KeyCode::BackTab;
    press.ctrl = event.modifiers.contains(KeyModifiers::CONTROL);

    Some(KeyDown { press, target })
}
