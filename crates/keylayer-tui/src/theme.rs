// Colors for the demo UI. Edit here to change the look.

use ratatui::style::Color;

/// App background - pure black for contrast
pub const BG_APP: Color = Color::Rgb(0, 0, 0);

/// Input field background
pub const BG_INPUT: Color = Color::Rgb(18, 18, 18);

pub const TEXT_PRIMARY: Color = Color::Rgb(229, 229, 229);
pub const TEXT_MUTED: Color = Color::Rgb(115, 115, 115);

/// Key combination labels in the hotkey panel
pub const ACCENT_KEY: Color = Color::Rgb(134, 239, 172);
pub const ACCENT_PRIMARY: Color = Color::Rgb(96, 165, 250);
pub const ACCENT_WARNING: Color = Color::Rgb(250, 204, 21);
