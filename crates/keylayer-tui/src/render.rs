use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::app::App;
use crate::demo::WIN_POINTS;
use crate::theme;

/// Width reserved for one hotkey cell (key + description) in the panel.
const HOTKEY_CELL_WIDTH: usize = 38;
const HOTKEY_KEY_WIDTH: usize = 14;

pub(crate) fn render(f: &mut Frame, app: &App) {
    let bg_block = Block::default().style(Style::default().bg(theme::BG_APP));
    f.render_widget(bg_block, f.area());

    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(f.area());

    render_header(f, app, chunks[0]);
    render_input(f, app, chunks[1]);
    render_hotkeys(f, app, chunks[2]);
    render_status(f, app, chunks[3]);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let game = &app.game;
    let mut spans = vec![
        Span::styled(
            format!(" {} points", game.points()),
            Style::default()
                .fg(theme::TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  x{}  goal {}", game.multiplier(), WIN_POINTS),
            Style::default().fg(theme::TEXT_MUTED),
        ),
    ];
    if game.has_won() && !game.continue_past_win() {
        spans.push(Span::styled(
            "  You won! Hotkeys are paused. Press Enter to keep playing.",
            Style::default().fg(theme::ACCENT_WARNING),
        ));
    }

    let layers: Vec<&str> = app.loaded_layers().map(|layer| layer.name.as_str()).collect();
    let header = Paragraph::new(Line::from(spans)).block(
        Block::bordered()
            .title(format!(" keylayer - {} ", layers.join(", ")))
            .border_style(Style::default().fg(theme::ACCENT_PRIMARY)),
    );
    f.render_widget(header, area);
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let (title, border) = if app.input_focused {
        (" Note (Enter to save, Esc to leave) ", theme::ACCENT_PRIMARY)
    } else {
        (" Note (i or Tab to write) ", theme::TEXT_MUTED)
    };
    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(theme::TEXT_PRIMARY).bg(theme::BG_INPUT))
        .block(Block::bordered().title(title).border_style(Style::default().fg(border)));
    f.render_widget(input, area);
}

fn render_hotkeys(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .hotkey_rows()
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .flat_map(|hotkey| {
                    let description = hotkey.description();
                    let padding = HOTKEY_CELL_WIDTH
                        .saturating_sub(HOTKEY_KEY_WIDTH)
                        .saturating_sub(description.chars().count());
                    [
                        Span::styled(
                            format!("{:<width$}", hotkey.key(), width = HOTKEY_KEY_WIDTH),
                            Style::default().fg(theme::ACCENT_KEY),
                        ),
                        Span::styled(
                            format!("{}{}", description, " ".repeat(padding)),
                            Style::default().fg(theme::TEXT_PRIMARY),
                        ),
                    ]
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let panel = Paragraph::new(lines).block(
        Block::bordered()
            .title(" Hotkeys ")
            .border_style(Style::default().fg(theme::TEXT_MUTED)),
    );
    f.render_widget(panel, area);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let text = app
        .status
        .clone()
        .unwrap_or_else(|| format!("{} notes saved - Ctrl+C to exit", app.notes.len()));
    let status = Paragraph::new(format!(" {text}")).style(Style::default().fg(theme::TEXT_MUTED));
    f.render_widget(status, area);
}
